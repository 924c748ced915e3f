//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

use crate::AppError;

/// Installs the global fmt subscriber.
///
/// The filter comes from `RUST_LOG` and falls back to `info`. `json` switches
/// the output to JSON lines.
///
/// # Errors
/// Returns [`AppError::Logging`] when a global subscriber is already set.
pub fn init_tracing(json: bool) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|error| AppError::Logging(error.to_string()))
}
