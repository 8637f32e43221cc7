//! Tracing setup and command logging helpers

use std::time::Duration;

use mes_domain::MesError;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// `--json-logs` wins; otherwise `MES_LOG_FORMAT=json` selects JSON.
    pub fn resolve(json_flag: bool, env_value: Option<&str>) -> Self {
        if json_flag || env_value.is_some_and(|v| v.trim().eq_ignore_ascii_case("json")) {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Install the global subscriber. The filter comes from `RUST_LOG` and
/// defaults to `info`. A second call is a no-op.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).try_init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(false)).try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Log the outcome of a command with structured fields.
///
/// `command` should be a stable identifier such as `"sync::sync_lemlist"`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error: Option<&MesError>) {
    let duration_ms = elapsed.as_millis() as u64;

    match error {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(err) => warn!(
            command,
            duration_ms,
            error_type = err.label(),
            error = %err,
            "command_execution_failure"
        ),
    }
}
