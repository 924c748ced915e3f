//! Fake transports shared by gateway integration tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use shield_gateway::{InvokeEnvelope, InvokeTransport, TransportError};

/// Transport that replays a fixed outcome and records every envelope.
#[derive(Debug)]
pub struct ScriptedTransport {
    outcome: Result<Value, String>,
    pub seen: Mutex<Vec<InvokeEnvelope>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    /// Always replies with `reply`.
    pub fn replying(reply: Value) -> Self {
        Self {
            outcome: Ok(reply),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Always fails as unreachable with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Number of calls received so far.
    pub fn calls(&self) -> usize {
        self.seen.lock().expect("seen lock should work").len()
    }
}

#[async_trait]
impl InvokeTransport for ScriptedTransport {
    async fn send(&self, envelope: &InvokeEnvelope) -> Result<Value, TransportError> {
        self.seen
            .lock()
            .expect("seen lock should work")
            .push(envelope.clone());
        match &self.outcome {
            Ok(reply) => Ok(reply.clone()),
            Err(message) => Err(TransportError::Unreachable(message.clone())),
        }
    }
}
