//! Integration tests for cancel-and-replace request handling.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeFunctions, controller};
use shield_app::ActionOutcome;
use shield_gateway::DemoMode;

#[tokio::test]
async fn overlapping_requests_tests_newer_analysis_wins() {
    let transport = Arc::new(FakeFunctions {
        slow_marker: Some(("first".to_string(), Duration::from_millis(80))),
        ..FakeFunctions::default()
    });
    let scanner = controller(transport.clone(), DemoMode::disabled());

    scanner.with_state(|state| state.set_text("first message"));
    let first = scanner.analyze();
    let second = async {
        scanner.with_state(|state| state.set_text("second message"));
        scanner.analyze().await
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first, ActionOutcome::Superseded);
    assert_eq!(second, ActionOutcome::Applied);
    assert_eq!(transport.calls(), 2);

    let state = scanner.snapshot();
    let analysis = state.analysis.as_ref().expect("analysis should be stored");
    assert_eq!(analysis.explanation, "second message");
    assert_eq!(state.notifications().len(), 1);
}

#[tokio::test]
async fn overlapping_requests_tests_analysis_supersedes_pending_rewrite() {
    let transport = Arc::new(FakeFunctions {
        slow_marker: Some(("slow".to_string(), Duration::from_millis(80))),
        ..FakeFunctions::default()
    });
    let scanner = controller(transport, DemoMode::disabled());
    scanner.with_state(|state| state.set_text("slow and annoying"));

    let rewrite = scanner.rewrite_safely();
    let analysis = async {
        scanner.with_state(|state| state.set_text("quick and annoying"));
        scanner.analyze().await
    };
    let (rewrite, analysis) = tokio::join!(rewrite, analysis);

    assert_eq!(rewrite, ActionOutcome::Superseded);
    assert_eq!(analysis, ActionOutcome::Applied);
    assert!(scanner.snapshot().safer_version.is_empty());
}
