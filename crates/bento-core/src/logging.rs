//! Logging bootstrap.
//!
//! Library crates only emit `tracing` events. Hosts that want output call
//! [`init`] once at startup (requires the `tracing-json` feature). The filter
//! honors `RUST_LOG`; when it is unset the supplied default directive is used.

#[cfg(feature = "tracing-json")]
use tracing_subscriber::EnvFilter;

/// Output format for the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Compact,
    /// One JSON object per event, for log shippers.
    Json,
}

/// Failure to install the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter directive {directive:?}: {reason}")]
    InvalidFilter { directive: String, reason: String },
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Install the global tracing subscriber.
#[cfg(feature = "tracing-json")]
pub fn init(format: LogFormat, default_directive: &str) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive).map_err(|e| LoggingError::InvalidFilter {
            directive: default_directive.to_owned(),
            reason: e.to_string(),
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|_| LoggingError::AlreadyInstalled)
}
