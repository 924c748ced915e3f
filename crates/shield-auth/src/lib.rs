#![warn(missing_docs)]
//! # shield-auth
//!
//! ## Purpose
//! Implements password login against the managed backend and the session
//! lifecycle that gates history access.
//!
//! ## Responsibilities
//! - Validate auth endpoint policy (`/auth/v1/token`, HTTPS).
//! - Execute login requests through an injectable transport abstraction.
//! - Model safe session transitions and expose the bearer token and user id.
//!
//! ## Data flow
//! CLI collects credentials -> [`AuthClient::login`] sends request through
//! [`AuthTransport`] -> receives [`SessionToken`] -> [`AuthStateMachine`]
//! updates runtime state -> gateway and history use the session.
//!
//! ## Ownership and lifetimes
//! Token/session values are owned (`String`) to decouple transport and runtime
//! state machine lifetimes.
//!
//! ## Error model
//! Endpoint policy violations and transport failures are surfaced as
//! [`AuthError`], allowing the app to prompt for login again.
//!
//! ## Security and privacy notes
//! This crate does not log credentials or token values.
//!
//! ## Example
//! ```rust
//! use shield_auth::{AuthStateMachine, AuthState};
//!
//! let machine = AuthStateMachine::new();
//! assert!(matches!(machine.state(), AuthState::Unauthenticated));
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use url::Url;

/// Required auth path suffix.
pub const REQUIRED_AUTH_PATH: &str = "/auth/v1/token";

/// User-provided login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Password-grant request payload forwarded to auth transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email for account lookup.
    pub email: String,
    /// Password for auth verification.
    pub password: String,
}

/// Authenticated user as returned by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Stable user identifier used as history owner.
    pub id: String,
    /// Account email, when returned.
    #[serde(default)]
    pub email: Option<String>,
}

/// Login response payload returned by auth transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Access token used for protected API calls.
    pub access_token: String,
    /// Lifetime duration in seconds.
    pub expires_in: u64,
    /// Authenticated user.
    pub user: AuthUser,
}

/// Session token with absolute expiry timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    /// Bearer token used by downstream APIs.
    pub access_token: String,
    /// Owning user id.
    pub user_id: String,
    /// Absolute epoch milliseconds when token expires.
    pub expires_at_ms: u64,
}

impl SessionToken {
    /// Returns `true` when token has expired at `now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Runtime authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No valid session exists.
    Unauthenticated,
    /// Session is currently valid.
    Authenticated(SessionToken),
    /// Session expired; login is required again.
    ReauthRequired,
}

/// Auth state machine with explicit legal transitions.
#[derive(Debug, Clone)]
pub struct AuthStateMachine {
    state: AuthState,
}

impl AuthStateMachine {
    /// Creates a new state machine in `Unauthenticated` state.
    pub fn new() -> Self {
        Self {
            state: AuthState::Unauthenticated,
        }
    }

    /// Returns current auth state snapshot.
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Applies login success transition.
    pub fn on_login_success(&mut self, token: SessionToken) {
        self.state = AuthState::Authenticated(token);
    }

    /// Re-evaluates state based on token expiry.
    pub fn on_tick(&mut self, now_ms: u64) {
        if let AuthState::Authenticated(token) = &self.state
            && token.is_expired(now_ms)
        {
            self.state = AuthState::ReauthRequired;
        }
    }

    /// Explicit logout transition.
    pub fn logout(&mut self) {
        self.state = AuthState::Unauthenticated;
    }

    /// Returns the session when it is still valid at `now_ms`.
    pub fn active_session(&self, now_ms: u64) -> Option<&SessionToken> {
        match &self.state {
            AuthState::Authenticated(token) if !token.is_expired(now_ms) => Some(token),
            _ => None,
        }
    }

    /// Returns `true` when user-scoped operations are allowed.
    pub fn can_invoke(&self, now_ms: u64) -> bool {
        self.active_session(now_ms).is_some()
    }
}

impl Default for AuthStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Abstract transport used by auth client.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    /// Sends login request to auth backend.
    async fn authenticate(
        &self,
        endpoint: &str,
        request: &LoginRequest,
    ) -> Result<LoginResponse, AuthError>;
}

/// Auth client that validates endpoint policy and executes login flow.
#[derive(Clone)]
pub struct AuthClient {
    endpoint: String,
    transport: Arc<dyn AuthTransport>,
}

impl AuthClient {
    /// Creates a validated auth client.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidEndpoint`] when URL is not HTTPS or does not
    /// end with the `/auth/v1/token` path.
    pub fn new(
        endpoint: impl Into<String>,
        transport: Arc<dyn AuthTransport>,
    ) -> Result<Self, AuthError> {
        let endpoint = endpoint.into();
        validate_auth_endpoint(&endpoint)?;
        Ok(Self {
            endpoint,
            transport,
        })
    }

    /// Executes login and converts server response into a session token.
    ///
    /// # Errors
    /// Returns [`AuthError::EmptyCredential`] for blank email/password.
    /// Propagates transport errors as-is for caller prompt behavior.
    pub async fn login(
        &self,
        credentials: &Credentials,
        now_ms: u64,
    ) -> Result<SessionToken, AuthError> {
        if credentials.email.trim().is_empty() || credentials.password.trim().is_empty() {
            return Err(AuthError::EmptyCredential);
        }

        let response = self
            .transport
            .authenticate(
                &self.endpoint,
                &LoginRequest {
                    email: credentials.email.trim().to_string(),
                    password: credentials.password.clone(),
                },
            )
            .await?;

        if response.access_token.trim().is_empty() || response.user.id.trim().is_empty() {
            return Err(AuthError::InvalidResponse(
                "response missing token or user id".to_string(),
            ));
        }

        let expires_at_ms = now_ms.saturating_add(response.expires_in.saturating_mul(1000));
        info!(user_id = %response.user.id, expires_at_ms, "session established");

        Ok(SessionToken {
            access_token: response.access_token,
            user_id: response.user.id,
            expires_at_ms,
        })
    }

    /// Returns configured auth endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Password-grant transport over HTTPS.
pub struct HttpAuthTransport {
    client: reqwest::Client,
    anon_key: String,
}

impl HttpAuthTransport {
    /// Creates a transport that sends `anon_key` as the `apikey` header.
    pub fn new(anon_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            anon_key: anon_key.into(),
        }
    }
}

#[async_trait]
impl AuthTransport for HttpAuthTransport {
    async fn authenticate(
        &self,
        endpoint: &str,
        request: &LoginRequest,
    ) -> Result<LoginResponse, AuthError> {
        let resp = self
            .client
            .post(endpoint)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(request)
            .send()
            .await
            .map_err(|error| AuthError::Transport(error.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AuthError::Transport(format!(
                "auth backend returned {}",
                status.as_u16()
            )));
        }

        resp.json()
            .await
            .map_err(|error| AuthError::InvalidResponse(error.to_string()))
    }
}

/// Validates auth endpoint constraints.
///
/// # Errors
/// Returns [`AuthError::InvalidEndpoint`] for non-HTTPS or path mismatch.
pub fn validate_auth_endpoint(endpoint: &str) -> Result<(), AuthError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| AuthError::InvalidEndpoint(format!("invalid auth url: {error}")))?;

    if parsed.scheme() != "https" {
        return Err(AuthError::InvalidEndpoint(
            "auth endpoint must use https".to_string(),
        ));
    }

    if !parsed.path().ends_with(REQUIRED_AUTH_PATH) {
        return Err(AuthError::InvalidEndpoint(format!(
            "auth endpoint path must end with {REQUIRED_AUTH_PATH}"
        )));
    }

    Ok(())
}

/// Errors produced by auth client/state logic.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Endpoint violates security or contract requirements.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Credentials are missing/blank.
    #[error("email and password must be non-empty")]
    EmptyCredential,
    /// Transport failure from auth backend.
    #[error("auth transport failure: {0}")]
    Transport(String),
    /// Response payload violated auth contract expectations.
    #[error("invalid auth response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth endpoint and state transitions.

    use super::*;

    #[test]
    fn validates_expected_endpoint_policy() {
        validate_auth_endpoint("https://project.test/auth/v1/token")
            .expect("endpoint should pass");
        assert!(validate_auth_endpoint("http://project.test/auth/v1/token").is_err());
        assert!(validate_auth_endpoint("https://project.test/auth/v1/signup").is_err());
    }

    #[test]
    fn state_machine_requires_reauth_after_expiry() {
        let mut machine = AuthStateMachine::new();
        machine.on_login_success(SessionToken {
            access_token: "token".to_string(),
            user_id: "user".to_string(),
            expires_at_ms: 1_000,
        });
        machine.on_tick(1_001);
        assert!(matches!(machine.state(), AuthState::ReauthRequired));
        assert!(machine.active_session(1_001).is_none());
    }

    #[test]
    fn login_response_decodes_backend_shape() {
        let raw = r#"{
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "r",
            "user": {"id": "5b1c", "email": "a@b.test", "role": "authenticated"}
        }"#;
        let response: LoginResponse =
            serde_json::from_str(raw).expect("login response should decode");
        assert_eq!(response.user.id, "5b1c");
        assert_eq!(response.expires_in, 3600);
    }
}
