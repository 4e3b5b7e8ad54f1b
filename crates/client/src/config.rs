//! Client configuration loaded from environment variables.

use std::time::Duration;

use anyhow::{Context, bail};

use crate::gateway::WriteMode;

/// Endpoint used when `STOCKROOM_SHEET_URL` is unset.
pub const DEFAULT_SHEET_URL: &str = "http://localhost:8080/exec";

/// How long a notice stays visible when `STOCKROOM_NOTICE_TTL_MS` is unset.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_millis(3000);

/// Reads from environment variables:
/// - `STOCKROOM_SHEET_URL`: read/write endpoint (default: [`DEFAULT_SHEET_URL`])
/// - `STOCKROOM_WRITE_MODE`: `fire-and-forget` or `acknowledged` (default: `fire-and-forget`)
/// - `STOCKROOM_NOTICE_TTL_MS`: notice lifetime in milliseconds (default: `3000`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub sheet_url: String,
    pub write_mode: WriteMode,
    pub notice_ttl: Duration,
}

impl ClientConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup (tests, embedding).
    ///
    /// Unset keys fall back to defaults; set-but-invalid values are errors.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("STOCKROOM_SHEET_URL") {
            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("STOCKROOM_SHEET_URL must be an http(s) URL, got {url:?}");
            }
            config.sheet_url = url.to_string();
        }

        if let Some(mode) = lookup("STOCKROOM_WRITE_MODE") {
            config.write_mode = mode
                .parse()
                .with_context(|| format!("invalid STOCKROOM_WRITE_MODE {mode:?}"))?;
        }

        if let Some(ttl) = lookup("STOCKROOM_NOTICE_TTL_MS") {
            let ms: u64 = ttl
                .trim()
                .parse()
                .with_context(|| format!("invalid STOCKROOM_NOTICE_TTL_MS {ttl:?}"))?;
            config.notice_ttl = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sheet_url: DEFAULT_SHEET_URL.to_string(),
            write_mode: WriteMode::FireAndForget,
            notice_ttl: DEFAULT_NOTICE_TTL,
        }
    }
}
