//! Integration tests for the offline demo substitution.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::ScriptedTransport;
use serde_json::json;
use shield_gateway::{DEMO_ADVICE, DEMO_SAFER_VERSION, DemoMode, Gateway};

#[tokio::test]
async fn demo_fallback_tests_substitutes_canned_analysis_after_delay() {
    let transport = Arc::new(ScriptedTransport::failing("Failed to send a request"));
    let delay = Duration::from_millis(20);
    let gateway = Gateway::new(transport.clone(), DemoMode::enabled(delay));

    let started = Instant::now();
    let reply = gateway
        .analyze_toxicity("You are so annoying!", None)
        .await
        .expect("demo mode should substitute a reply");

    assert!(started.elapsed() >= delay);
    assert_eq!(
        reply,
        json!({
            "toxicityScore": 72,
            "categories": ["harassment", "profanity"],
            "highlightedWords": ["annoying"],
            "severity": "high",
            "explanation": "Contains insulting language and harassment towards the recipient."
        })
    );
    assert_eq!(transport.calls(), 1, "the real call must not be re-attempted");
}

#[tokio::test]
async fn demo_fallback_tests_failure_propagates_when_flag_unset() {
    let transport = Arc::new(ScriptedTransport::failing("Failed to send a request"));
    let gateway = Gateway::new(transport.clone(), DemoMode::disabled());

    let error = gateway
        .analyze_toxicity("You are so annoying!", None)
        .await
        .expect_err("failure should propagate without demo mode");

    assert_eq!(error.message(), "Failed to send a request");
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn demo_fallback_tests_covers_rewrite_and_advice() {
    let gateway = Gateway::new(
        Arc::new(ScriptedTransport::failing("offline")),
        DemoMode::enabled(Duration::from_millis(1)),
    );

    let safer = gateway
        .generate_safer_version("text", Some("gpt"))
        .await
        .expect("rewrite should be substituted");
    assert_eq!(safer, json!({"saferVersion": DEMO_SAFER_VERSION}));

    let advice = gateway
        .generate_advice("text", &["harassment".to_string()], "high", None)
        .await
        .expect("advice should be substituted");
    assert_eq!(advice, json!({"advice": DEMO_ADVICE}));
}

#[tokio::test]
async fn demo_fallback_tests_embedded_error_also_triggers_substitution() {
    let gateway = Gateway::new(
        Arc::new(ScriptedTransport::replying(json!({"error": "model overloaded"}))),
        DemoMode::enabled(Duration::from_millis(1)),
    );

    let reply = gateway
        .generate_safer_version("text", None)
        .await
        .expect("embedded error should be substituted in demo mode");
    assert_eq!(reply["saferVersion"], DEMO_SAFER_VERSION);
}

#[tokio::test]
async fn demo_fallback_tests_success_is_never_replaced() {
    let real = json!({"toxicity_score": 3, "category": []});
    let gateway = Gateway::new(
        Arc::new(ScriptedTransport::replying(real.clone())),
        DemoMode::enabled(Duration::from_millis(1)),
    );

    let reply = gateway
        .analyze_toxicity("hello", None)
        .await
        .expect("real reply should be returned");
    assert_eq!(reply, real);
}

#[tokio::test]
async fn demo_fallback_tests_blank_text_gets_canned_reply_in_demo_mode() {
    let transport = Arc::new(ScriptedTransport::failing("unused"));
    let gateway = Gateway::new(
        transport.clone(),
        DemoMode::enabled(Duration::from_millis(1)),
    );

    let reply = gateway
        .generate_advice("   ", &[], "low", None)
        .await
        .expect("blank text should be substituted in demo mode");
    assert_eq!(reply, json!({"advice": DEMO_ADVICE}));
    assert_eq!(transport.calls(), 0, "blank text is never sent");
}

#[tokio::test]
async fn demo_fallback_tests_blank_text_fails_without_demo_mode() {
    let transport = Arc::new(ScriptedTransport::failing("unused"));
    let gateway = Gateway::new(transport.clone(), DemoMode::disabled());

    let error = gateway
        .analyze_toxicity("", None)
        .await
        .expect_err("blank text should be rejected");
    assert_eq!(error.message(), "Please enter some text to analyze");
    assert_eq!(transport.calls(), 0);
}
