//! HTTP transport for the managed backend's function endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use shield_core::RemoteFunction;
use tracing::debug;
use url::Url;

use crate::{InvokeEnvelope, InvokeTransport, TransportError};

/// Default request timeout for remote function calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Posts function payloads to `{functions_url}/{function}`.
pub struct HttpInvokeTransport {
    client: reqwest::Client,
    functions_url: String,
    anon_key: String,
}

impl HttpInvokeTransport {
    /// Creates a transport for the given function base URL.
    ///
    /// `functions_url` should look like `https://<project>/functions/v1`.
    /// `anon_key` is sent as the `apikey` header and as the bearer token when
    /// no user session is attached to the call.
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidEndpoint`] when the URL is not HTTPS.
    /// Returns [`TransportError::Http`] when the client cannot be built.
    pub fn new(
        functions_url: &str,
        anon_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        validate_functions_url(functions_url)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            functions_url: functions_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        })
    }

    /// Returns the full URL invoked for `function`.
    pub fn endpoint(&self, function: RemoteFunction) -> String {
        format!("{}/{}", self.functions_url, function.name())
    }
}

#[async_trait]
impl InvokeTransport for HttpInvokeTransport {
    async fn send(&self, envelope: &InvokeEnvelope) -> Result<Value, TransportError> {
        let url = self.endpoint(envelope.function);
        let bearer = envelope.access_token.as_deref().unwrap_or(&self.anon_key);

        debug!(url = %url, function = %envelope.function, "invoking remote function");
        let resp = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .json(&envelope.body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Server {
                status: status.as_u16(),
                message: server_error_message(&body),
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|error| TransportError::Decode(error.to_string()))
    }
}

/// Validates that the function base URL is an HTTPS URL.
///
/// # Errors
/// Returns [`TransportError::InvalidEndpoint`] for malformed or non-HTTPS URLs.
pub fn validate_functions_url(functions_url: &str) -> Result<(), TransportError> {
    let parsed = Url::parse(functions_url)
        .map_err(|error| TransportError::InvalidEndpoint(format!("invalid url: {error}")))?;

    if parsed.scheme() != "https" {
        return Err(TransportError::InvalidEndpoint(
            "function endpoint must use https".to_string(),
        ));
    }

    Ok(())
}

// Prefer the JSON `error`/`message` field of an error body over the raw text.
fn server_error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|value| {
            ["error", "message"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}
