//! Integration tests for demo substitution seen from the scanner.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{FakeFunctions, controller};
use shield_app::ActionOutcome;
use shield_gateway::{DEMO_ADVICE, DEMO_EXPLANATION, DEMO_SAFER_VERSION, DemoMode};

#[tokio::test]
async fn demo_fallback_flow_tests_unreachable_backend_yields_canned_scan() {
    let transport = Arc::new(FakeFunctions {
        unreachable: true,
        ..FakeFunctions::default()
    });
    let scanner = controller(transport, DemoMode::enabled(Duration::from_millis(20)));
    scanner.with_state(|state| state.set_text("anything"));

    let started = Instant::now();
    assert_eq!(scanner.analyze().await, ActionOutcome::Applied);
    assert!(started.elapsed() >= Duration::from_millis(20));
    assert_eq!(scanner.rewrite_safely().await, ActionOutcome::Applied);
    assert_eq!(scanner.get_advice().await, ActionOutcome::Applied);

    let state = scanner.snapshot();
    let analysis = state.analysis.as_ref().expect("canned analysis expected");
    assert_eq!(analysis.toxicity_score, 72);
    assert_eq!(analysis.explanation, DEMO_EXPLANATION);
    assert_eq!(analysis.model_used, "gemini");
    assert_eq!(state.safer_version, DEMO_SAFER_VERSION);
    assert_eq!(state.advice, DEMO_ADVICE);
}
