#![warn(missing_docs)]
//! # shield-app
//!
//! ## Purpose
//! Orchestrates gateway, normalizer, auth, history, settings and view state
//! for digital-shield.
//!
//! ## Responsibilities
//! - Drive scanner actions end to end through [`ScannerController`].
//! - Gate history and settings access on an active session.
//! - Resolve configuration and install logging for the binary.
//! - Provide transport security checks and log redaction.
//!
//! ## Data flow
//! [`AppConfig`] -> gateway + history store -> [`ScannerController`] actions
//! -> normalized results in view state -> history / export.
//!
//! ## Ownership and lifetimes
//! The controller shares the gateway and store behind `Arc` and keeps view
//! state behind a mutex that is released before every await.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]; the binary reports them
//! through `anyhow`.
//!
//! ## Security and privacy notes
//! - Remote calls require HTTPS endpoints.
//! - Log redaction helpers strip token and credential strings.

use shield_auth::AuthError;
use shield_export::ExportError;
use shield_gateway::GatewayError;
use shield_history::HistoryError;
use shield_settings::SettingsError;
use thiserror::Error;
use time::OffsetDateTime;
use url::Url;

mod config;
mod controller;
mod logging;

pub use config::{AppConfig, DEFAULT_HISTORY_PATH, DEFAULT_SETTINGS_PATH};
pub use controller::{ActionOutcome, ScannerController};
pub use logging::init_tracing;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("SHIELD_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> u64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    u64::try_from(nanos / 1_000_000).unwrap_or(0)
}

/// Returns `true` when endpoint URL is HTTPS.
pub fn is_https_endpoint(endpoint: &str) -> bool {
    Url::parse(endpoint)
        .map(|url| url.scheme() == "https")
        .unwrap_or(false)
}

/// Redacts common secret markers in log-safe output.
///
/// Everything after the first secret marker is replaced.
pub fn redact_sensitive(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let first = ["password", "token", "authorization", "bearer", "apikey"]
        .into_iter()
        .filter_map(|key| lower.find(key).map(|position| (position, key)))
        .min_by_key(|(position, _)| *position);

    match first {
        Some((position, key)) => format!("{}{key}=<redacted>", &input[..position]),
        None => input.to_string(),
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration rejected before start.
    #[error("config error: {0}")]
    Config(String),
    /// Logging could not be installed.
    #[error("logging error: {0}")]
    Logging(String),
    /// Auth subsystem error.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
    /// Remote function failure.
    #[error("{0}")]
    Gateway(#[from] GatewayError),
    /// History storage failure.
    #[error("history error: {0}")]
    History(#[from] HistoryError),
    /// Settings storage failure.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    /// Report rendering or write failure.
    #[error("export error: {0}")]
    Export(#[from] ExportError),
    /// History access attempted without a session.
    #[error("You need to be logged in to save history")]
    LoginRequired,
    /// Save attempted before any analysis.
    #[error("nothing to save: analyze a message first")]
    NothingToSave,
}
