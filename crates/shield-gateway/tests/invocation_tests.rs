//! Integration tests for request dispatch and error uniformity.

mod common;

use std::sync::Arc;

use common::ScriptedTransport;
use serde_json::json;
use shield_core::RemoteFunction;
use shield_gateway::{DemoMode, GENERIC_FAILURE_MESSAGE, Gateway};

#[tokio::test]
async fn invocation_tests_passes_reply_through_unmodified() {
    let raw = json!({"toxicity": 12, "reason": "mild", "extra": {"nested": true}});
    let gateway = Gateway::new(
        Arc::new(ScriptedTransport::replying(raw.clone())),
        DemoMode::disabled(),
    );

    let reply = gateway
        .analyze_toxicity("hi", Some("gpt"))
        .await
        .expect("reply should pass through");
    assert_eq!(reply, raw);
}

#[tokio::test]
async fn invocation_tests_sends_named_function_with_payload_and_token() {
    let transport = Arc::new(ScriptedTransport::replying(json!({"advice": "ok"})));
    let gateway = Gateway::new(transport.clone(), DemoMode::disabled());
    gateway.set_access_token(Some("session-token".to_string()));

    gateway
        .generate_advice("msg", &["spam".to_string()], "medium", None)
        .await
        .expect("call should succeed");

    let seen = transport.seen.lock().expect("seen lock should work");
    assert_eq!(seen[0].function, RemoteFunction::GenerateAdvice);
    assert_eq!(seen[0].access_token.as_deref(), Some("session-token"));
    assert_eq!(
        seen[0].body,
        json!({"text": "msg", "categories": ["spam"], "severity": "medium", "model": "gemini"})
    );
}

#[tokio::test]
async fn invocation_tests_embedded_error_becomes_gateway_error() {
    let gateway = Gateway::new(
        Arc::new(ScriptedTransport::replying(json!({"error": "Rate limit exceeded"}))),
        DemoMode::disabled(),
    );

    let error = gateway
        .generate_safer_version("msg", None)
        .await
        .expect_err("embedded error should fail the call");
    assert_eq!(error.message(), "Rate limit exceeded");
}

#[tokio::test]
async fn invocation_tests_blank_transport_message_uses_generic_text() {
    let gateway = Gateway::new(
        Arc::new(ScriptedTransport::failing("")),
        DemoMode::disabled(),
    );

    let error = gateway
        .analyze_toxicity("msg", None)
        .await
        .expect_err("call should fail");
    assert_eq!(error.message(), GENERIC_FAILURE_MESSAGE);
}
