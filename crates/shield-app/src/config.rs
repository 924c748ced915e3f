//! Runtime configuration resolved from flags and environment.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use shield_auth::{AuthClient, HttpAuthTransport};
use shield_core::DEFAULT_MODEL;
use shield_gateway::{
    DEFAULT_DEMO_DELAY, DEFAULT_REQUEST_TIMEOUT, DemoMode, Gateway, HttpInvokeTransport,
};

use crate::{AppError, is_https_endpoint};

/// Default history file, relative to the working directory.
pub const DEFAULT_HISTORY_PATH: &str = "shield-history.json";

/// Default settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_PATH: &str = "shield-settings.json";

/// Connection, model and storage settings shared by every command.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Base URL of the remote functions, e.g. `https://<project>/functions/v1`.
    #[arg(long, env = "SHIELD_FUNCTIONS_URL")]
    pub functions_url: String,

    /// Password-grant endpoint ending in `/auth/v1/token`.
    #[arg(long, env = "SHIELD_AUTH_URL")]
    pub auth_url: Option<String>,

    /// Public API key sent as the `apikey` header.
    #[arg(long, env = "SHIELD_ANON_KEY", default_value = "", hide_env_values = true)]
    pub anon_key: String,

    /// Model selector passed to remote functions.
    #[arg(long, env = "SHIELD_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Persisted demo flag; `1` enables canned replies on failure.
    #[arg(long = "demo", env = "SHIELD_DEMO_MODE")]
    pub demo_flag: Option<String>,

    /// Simulated latency of canned demo replies in milliseconds.
    #[arg(long, env = "SHIELD_DEMO_DELAY_MS", default_value_t = DEFAULT_DEMO_DELAY.as_millis() as u64)]
    pub demo_delay_ms: u64,

    /// Page URL whose query may carry `demo=1` or `sample=1`.
    #[arg(long, env = "SHIELD_PAGE_URL")]
    pub page_url: Option<String>,

    /// JSON file backing the scan history.
    #[arg(long, env = "SHIELD_HISTORY_PATH", default_value = DEFAULT_HISTORY_PATH)]
    pub history_path: PathBuf,

    /// JSON file backing per-user language and theme.
    #[arg(long, env = "SHIELD_SETTINGS_PATH", default_value = DEFAULT_SETTINGS_PATH)]
    pub settings_path: PathBuf,

    /// Request timeout for remote functions in seconds.
    #[arg(long, env = "SHIELD_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Emit logs as JSON lines.
    #[arg(long, env = "SHIELD_LOG_JSON")]
    pub log_json: bool,

    /// Account email used for history commands.
    #[arg(long, env = "SHIELD_EMAIL")]
    pub email: Option<String>,

    /// Account password used for history commands.
    #[arg(long, env = "SHIELD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl AppConfig {
    /// Checks transport policy before any client is built.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when the functions URL is not HTTPS.
    pub fn validate(&self) -> Result<(), AppError> {
        if !is_https_endpoint(&self.functions_url) {
            return Err(AppError::Config(format!(
                "functions url must use https: {}",
                self.functions_url
            )));
        }
        if let Some(auth_url) = &self.auth_url
            && !is_https_endpoint(auth_url)
        {
            return Err(AppError::Config(format!(
                "auth url must use https: {auth_url}"
            )));
        }
        Ok(())
    }

    /// Resolves demo mode from the page URL and the persisted flag.
    pub fn demo_mode(&self) -> DemoMode {
        DemoMode::detect(
            self.page_url.as_deref(),
            self.demo_flag.as_deref(),
            Duration::from_millis(self.demo_delay_ms),
        )
    }

    /// Builds the HTTP-backed gateway.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] for an invalid URL and
    /// [`AppError::Gateway`] when the HTTP client cannot be built.
    pub fn build_gateway(&self) -> Result<Gateway, AppError> {
        self.validate()?;
        let transport = HttpInvokeTransport::new(
            &self.functions_url,
            &self.anon_key,
            Duration::from_secs(self.timeout_secs.max(1)),
        )
        .map_err(shield_gateway::GatewayError::from)?;
        Ok(Gateway::new(Arc::new(transport), self.demo_mode()))
    }

    /// Builds the auth client when an auth URL is configured.
    ///
    /// # Errors
    /// Returns [`AppError::Auth`] when the endpoint violates auth policy.
    pub fn build_auth_client(&self) -> Result<Option<AuthClient>, AppError> {
        let Some(auth_url) = &self.auth_url else {
            return Ok(None);
        };
        let transport = Arc::new(HttpAuthTransport::new(self.anon_key.clone()));
        Ok(Some(AuthClient::new(auth_url.clone(), transport)?))
    }
}
