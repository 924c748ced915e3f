//! Integration tests for scanner view state transitions.

use shield_analysis_contract::{AnalysisResult, Severity};
use shield_core::DemoScenario;
use shield_settings::Language;
use shield_ui::{NotificationKind, RequestKind, ScannerState, SeverityStyle};

fn analysis(score: u8, severity: Severity) -> AnalysisResult {
    AnalysisResult {
        toxicity_score: score,
        categories: vec!["harassment".to_string()],
        highlighted_words: vec!["annoying".to_string()],
        severity,
        explanation: "x".to_string(),
        model_used: "gemini".to_string(),
    }
}

fn analyzed_state() -> ScannerState {
    let mut state = ScannerState::new("0.1.0");
    state.set_text("You are so annoying!");
    let pending = state.begin_analysis().expect("analysis should start");
    assert!(state.complete_analysis(pending.ticket, analysis(72, Severity::High)));
    state.take_notifications();
    state
}

#[test]
fn scanner_state_tests_toxic_result_reports_severity() {
    let mut state = ScannerState::new("0.1.0");
    state.set_text("You are so annoying!");
    state.set_model("gpt");

    let pending = state.begin_analysis().expect("analysis should start");
    assert_eq!(pending.model, "gpt");
    assert!(state.is_busy(RequestKind::Analyze));

    assert!(state.complete_analysis(pending.ticket, analysis(72, Severity::High)));
    assert!(!state.is_busy(RequestKind::Analyze));
    assert_eq!(state.severity_style(), Some(SeverityStyle::Orange));

    let notes = state.take_notifications();
    assert_eq!(notes[0].title, "Analysis Complete");
    assert_eq!(notes[0].description, "Toxicity detected (high severity)");
}

#[test]
fn scanner_state_tests_low_score_reports_safe() {
    let mut state = ScannerState::new("0.1.0");
    state.load_scenario(DemoScenario::Low);
    let pending = state.begin_analysis().expect("analysis should start");
    state.complete_analysis(pending.ticket, analysis(30, Severity::Low));
    assert_eq!(
        state.notifications()[0].description,
        "Message appears safe"
    );
}

#[test]
fn scanner_state_tests_new_analysis_clears_results_and_supersedes_all() {
    let mut state = analyzed_state();
    let rewrite = state.begin_safer_version().expect("rewrite should start");
    let advice = state.begin_advice().expect("advice should start");
    assert_eq!(advice.categories, vec!["harassment".to_string()]);
    assert_eq!(advice.severity, "high");
    state.safer_version = "kept?".to_string();

    let second = state.begin_analysis().expect("analysis should start");
    assert!(state.analysis.is_none());
    assert!(state.safer_version.is_empty());
    assert!(state.advice.is_empty());

    assert!(!state.complete_safer_version(rewrite.ticket, "late".to_string()));
    assert!(!state.complete_advice(advice.ticket, "late".to_string()));
    assert!(state.safer_version.is_empty());
    assert!(state.advice.is_empty());
    assert!(state.notifications().is_empty());

    assert!(state.complete_analysis(second.ticket, analysis(10, Severity::Low)));
}

#[test]
fn scanner_state_tests_newer_rewrite_wins() {
    let mut state = analyzed_state();
    let first = state.begin_safer_version().expect("rewrite should start");
    let second = state.begin_safer_version().expect("rewrite should start");

    assert!(state.complete_safer_version(second.ticket, "newest".to_string()));
    assert!(!state.complete_safer_version(first.ticket, "oldest".to_string()));
    assert_eq!(state.safer_version, "newest");
    assert_eq!(state.notifications().len(), 1);
}

#[test]
fn scanner_state_tests_failure_keeps_no_partial_state() {
    let mut state = analyzed_state();
    let pending = state.begin_advice().expect("advice should start");

    assert!(state.fail(pending.ticket, "API invocation failed"));
    assert!(state.advice.is_empty());
    assert!(!state.is_busy(RequestKind::Advice));

    let notes = state.take_notifications();
    assert_eq!(notes[0].kind, NotificationKind::Error);
    assert_eq!(notes[0].title, "Failed to generate advice");
    assert_eq!(notes[0].description, "API invocation failed");
}

#[test]
fn scanner_state_tests_clear_resets_everything() {
    let mut state = analyzed_state();
    state.clear();
    assert!(state.text.is_empty());
    assert!(state.analysis.is_none());
    assert_eq!(state.highlighted().len(), 1);
}

#[test]
fn scanner_state_tests_labels_follow_language() {
    let mut state = ScannerState::new("0.1.0");
    assert_eq!(state.label("scanner.analyze"), "Analyze Message");

    state.settings.language = Language::Swahili;
    assert_eq!(state.label("scanner.analyze"), "Changanuza Ujumbe");
    assert_eq!(state.label("not.a.key"), "not.a.key");

    state.clear();
    assert_eq!(state.settings.language, Language::Swahili, "clear keeps settings");
}
