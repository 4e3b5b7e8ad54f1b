//! Process-wide logging for stockroom binaries.

pub mod logging;

pub use logging::{DEFAULT_FILTER, LogFormat};

/// Install the `tracing` subscriber using `RUST_LOG` and `STOCKROOM_LOG_FORMAT`.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init() -> bool {
    let format = LogFormat::from_lookup(|key| std::env::var(key).ok());
    logging::init_with(DEFAULT_FILTER, format)
}
