//! Shared fixtures for app integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use shield_app::ScannerController;
use shield_auth::SessionToken;
use shield_core::RemoteFunction;
use shield_gateway::{DemoMode, Gateway, InvokeEnvelope, InvokeTransport, TransportError};
use shield_history::MemoryHistoryStore;

/// Fake backend: scores texts containing "annoying" as toxic and echoes the
/// request text in the explanation.
#[derive(Debug, Default)]
pub struct FakeFunctions {
    /// Fail every call as unreachable.
    pub unreachable: bool,
    /// Extra latency for requests whose text contains this marker.
    pub slow_marker: Option<(String, Duration)>,
    /// Envelopes received so far.
    pub seen: Mutex<Vec<InvokeEnvelope>>,
}

#[allow(dead_code)]
impl FakeFunctions {
    /// Number of calls received so far.
    pub fn calls(&self) -> usize {
        self.seen.lock().expect("seen lock should work").len()
    }
}

#[async_trait]
impl InvokeTransport for FakeFunctions {
    async fn send(&self, envelope: &InvokeEnvelope) -> Result<Value, TransportError> {
        self.seen
            .lock()
            .expect("seen lock should work")
            .push(envelope.clone());

        let text = envelope.body["text"].as_str().unwrap_or_default().to_string();
        if let Some((marker, delay)) = &self.slow_marker
            && text.contains(marker.as_str())
        {
            tokio::time::sleep(*delay).await;
        } else {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        if self.unreachable {
            return Err(TransportError::Unreachable("connection refused".to_string()));
        }

        Ok(match envelope.function {
            RemoteFunction::AnalyzeToxicity if text.contains("annoying") => json!({
                "toxicity_score": 64.4,
                "category": "harassment",
                "highlighted_words": ["annoying"],
                "severity": "high",
                "reason": text,
            }),
            RemoteFunction::AnalyzeToxicity => json!({
                "toxicityScore": 4,
                "categories": [],
                "explanation": text,
            }),
            RemoteFunction::GenerateSaferVersion => json!({"safer": format!("kind: {text}")}),
            RemoteFunction::GenerateAdvice => json!({"result": "block and report"}),
        })
    }
}

/// Controller over a fake backend and an in-memory history.
#[allow(dead_code)]
pub fn controller(transport: Arc<FakeFunctions>, demo: DemoMode) -> ScannerController {
    ScannerController::new(
        Arc::new(Gateway::new(transport, demo)),
        Arc::new(MemoryHistoryStore::new()),
        "0.1.0",
    )
}

/// Session valid until `expires_at_ms`.
#[allow(dead_code)]
pub fn session(user_id: &str, expires_at_ms: u64) -> SessionToken {
    SessionToken {
        access_token: format!("jwt-{user_id}"),
        user_id: user_id.to_string(),
        expires_at_ms,
    }
}
