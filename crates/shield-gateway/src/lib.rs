#![warn(missing_docs)]
//! # shield-gateway
//!
//! ## Purpose
//! Invokes the three remote AI functions and returns their raw replies.
//!
//! ## Responsibilities
//! - Serialize [`FunctionRequest`] payloads and hand them to a transport.
//! - Treat replies that embed an `error` field as failures.
//! - Collapse every failure into one [`GatewayError`] carrying a readable
//!   message.
//! - Substitute canned replies after a short delay when [`DemoMode`] is on.
//!
//! ## Data flow
//! Scanner action -> [`Gateway::invoke`] -> [`InvokeTransport::send`] ->
//! raw JSON reply -> caller normalizes it.
//!
//! ## Ownership and lifetimes
//! The gateway is shared behind `Arc` by concurrent view actions; the session
//! token is swapped through a lock that is never held across an await.
//!
//! ## Error model
//! Transports report [`TransportError`]; the gateway converts it to
//! [`GatewayError`] and does not otherwise distinguish causes to callers.
//! There is no retry. Demo substitution fires at most once per call and never
//! re-attempts the real call.
//!
//! ## Security and privacy notes
//! Access tokens are forwarded to the transport only; they are never logged.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use shield_core::{CoreError, FunctionRequest, RemoteFunction};
use thiserror::Error;
use tracing::{info, warn};

mod demo;
mod http;

pub use demo::{
    DEFAULT_DEMO_DELAY, DEMO_ADVICE, DEMO_EXPLANATION, DEMO_QUERY_PARAM, DEMO_SAFER_VERSION,
    DemoMode, demo_flag_in_url, demo_flag_value, demo_reply,
};
pub use http::{DEFAULT_REQUEST_TIMEOUT, HttpInvokeTransport, validate_functions_url};

/// Message used when a failure carries no text of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "API invocation failed";

/// One remote call as seen by a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeEnvelope {
    /// Target function.
    pub function: RemoteFunction,
    /// JSON request body.
    pub body: Value,
    /// User session token, when one is attached.
    pub access_token: Option<String>,
}

/// Abstract transport used by the gateway.
#[async_trait]
pub trait InvokeTransport: Send + Sync {
    /// Sends one envelope and returns the decoded JSON reply.
    async fn send(&self, envelope: &InvokeEnvelope) -> Result<Value, TransportError>;
}

/// Failure modes reported by transports.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network or client-level failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success status from the backend.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error text extracted from the response body.
        message: String,
    },
    /// Reply body was not valid JSON.
    #[error("invalid reply: {0}")]
    Decode(String),
    /// Reply decoded but carried an `error` field.
    #[error("{0}")]
    Remote(String),
    /// Endpoint violates transport policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Backend could not be reached.
    #[error("{0}")]
    Unreachable(String),
}

/// Uniform error surfaced to gateway callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GatewayError {
    message: String,
}

impl GatewayError {
    /// Creates an error, substituting the generic message for blank text.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return Self {
                message: GENERIC_FAILURE_MESSAGE.to_string(),
            };
        }
        Self { message }
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<TransportError> for GatewayError {
    fn from(error: TransportError) -> Self {
        GatewayError::new(error.to_string())
    }
}

impl From<CoreError> for GatewayError {
    fn from(error: CoreError) -> Self {
        GatewayError::new(error.to_string())
    }
}

/// Invokes remote functions through a transport, with optional demo fallback.
pub struct Gateway {
    transport: Arc<dyn InvokeTransport>,
    demo: DemoMode,
    access_token: RwLock<Option<String>>,
}

impl Gateway {
    /// Creates a gateway with an explicit demo-mode setting.
    pub fn new(transport: Arc<dyn InvokeTransport>, demo: DemoMode) -> Self {
        Self {
            transport,
            demo,
            access_token: RwLock::new(None),
        }
    }

    /// Returns the configured demo mode.
    pub fn demo_mode(&self) -> DemoMode {
        self.demo
    }

    /// Attaches or clears the user session token sent with each call.
    pub fn set_access_token(&self, token: Option<String>) {
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Classifies `text`; `model` defaults to the standard selector.
    ///
    /// Blank text is rejected before anything is sent; in demo mode that
    /// rejection is replaced by the canned reply like any other failure.
    ///
    /// # Errors
    /// Returns [`GatewayError`] when the call fails and demo mode is off.
    pub async fn analyze_toxicity(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> Result<Value, GatewayError> {
        self.dispatch(
            RemoteFunction::AnalyzeToxicity,
            FunctionRequest::analyze(text, model),
        )
        .await
    }

    /// Requests a safer rewrite of `text`.
    ///
    /// # Errors
    /// Returns [`GatewayError`] when the call fails and demo mode is off.
    pub async fn generate_safer_version(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> Result<Value, GatewayError> {
        self.dispatch(
            RemoteFunction::GenerateSaferVersion,
            FunctionRequest::safer_version(text, model),
        )
        .await
    }

    /// Requests safety advice for `text` given a previous analysis.
    ///
    /// # Errors
    /// Returns [`GatewayError`] when the call fails and demo mode is off.
    pub async fn generate_advice(
        &self,
        text: &str,
        categories: &[String],
        severity: &str,
        model: Option<&str>,
    ) -> Result<Value, GatewayError> {
        let request = FunctionRequest::advice(text, categories.to_vec(), severity, model);
        self.dispatch(RemoteFunction::GenerateAdvice, request).await
    }

    async fn dispatch(
        &self,
        function: RemoteFunction,
        request: Result<FunctionRequest, CoreError>,
    ) -> Result<Value, GatewayError> {
        match request {
            Ok(request) => self.invoke(&request).await,
            Err(error) => self.fail(function, error.to_string()).await,
        }
    }

    /// Invokes the function named by `request` and returns its raw reply.
    ///
    /// # Errors
    /// Returns [`GatewayError`] for transport failures and embedded error
    /// payloads, unless demo mode substitutes a canned reply.
    pub async fn invoke(&self, request: &FunctionRequest) -> Result<Value, GatewayError> {
        let function = request.function();
        let body = match request.to_body() {
            Ok(body) => body,
            Err(error) => return self.fail(function, error.to_string()).await,
        };
        let envelope = InvokeEnvelope {
            function,
            body,
            access_token: self.current_token(),
        };

        let outcome = match self.transport.send(&envelope).await {
            Ok(reply) => reject_embedded_error(reply),
            Err(error) => Err(error),
        };

        match outcome {
            Ok(reply) => {
                info!(function = %function, model = request.model(), "remote function completed");
                Ok(reply)
            }
            Err(error) => self.fail(function, error.to_string()).await,
        }
    }

    /// Substitutes the canned reply in demo mode, otherwise surfaces `message`.
    async fn fail(&self, function: RemoteFunction, message: String) -> Result<Value, GatewayError> {
        if self.demo.is_enabled() {
            warn!(
                function = %function,
                error = %message,
                delay_ms = self.demo.delay().as_millis() as u64,
                "remote function failed; substituting demo reply"
            );
            tokio::time::sleep(self.demo.delay()).await;
            return Ok(demo_reply(function));
        }

        warn!(function = %function, error = %message, "remote function failed");
        Err(GatewayError::new(message))
    }

    fn current_token(&self) -> Option<String> {
        self.access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Fails replies whose `error` field holds a truthy value.
fn reject_embedded_error(reply: Value) -> Result<Value, TransportError> {
    let message = match reply.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return Ok(reply),
        Some(Value::String(text)) if text.is_empty() => return Ok(reply),
        Some(Value::Number(number)) if number.as_f64() == Some(0.0) => return Ok(reply),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Object(object)) => object
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| Value::Object(object.clone()).to_string()),
        Some(other) => other.to_string(),
    };

    Err(TransportError::Remote(message))
}

#[cfg(test)]
mod tests {
    //! Unit tests for embedded-error detection and message fallback.

    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_error_fields_pass_through() {
        for reply in [
            json!({"error": null, "advice": "x"}),
            json!({"error": false}),
            json!({"error": ""}),
            json!({"error": 0}),
            json!({"advice": "x"}),
        ] {
            assert!(reject_embedded_error(reply).is_ok());
        }
    }

    #[test]
    fn truthy_error_fields_fail() {
        let error = reject_embedded_error(json!({"error": "quota exceeded"})).unwrap_err();
        assert_eq!(error.to_string(), "quota exceeded");

        let error = reject_embedded_error(json!({"error": {"message": "bad model"}})).unwrap_err();
        assert_eq!(error.to_string(), "bad model");
    }

    #[test]
    fn blank_messages_become_generic() {
        assert_eq!(GatewayError::new("  ").message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(
            GatewayError::from(TransportError::Unreachable(String::new())).message(),
            GENERIC_FAILURE_MESSAGE
        );
    }
}
