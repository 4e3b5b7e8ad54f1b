//! `tracing-subscriber` setup.
//!
//! Logs always go to stderr: the `stockroom` binary prints the catalog on
//! stdout and the two must not interleave.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Line format of emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Single-line human-readable output.
    Compact,
}

impl LogFormat {
    /// Read `STOCKROOM_LOG_FORMAT` (`json` or `compact`); anything else is JSON.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("STOCKROOM_LOG_FORMAT")
            .map(|v| v.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("compact") => LogFormat::Compact,
            _ => LogFormat::Json,
        }
    }
}

/// Install a global subscriber with `default_filter` as the `RUST_LOG` fallback.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_with(default_filter: &str, format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let directives = filter.to_string();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Compact => builder.compact().try_init().is_ok(),
    };

    if installed {
        tracing::debug!(filter = %directives, format = ?format, "Logging initialized");
    }
    installed
}
