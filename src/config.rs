//! Configuration types for keiba-fetch

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

fn default_timeout_millis() -> u64 {
    30_000
}

fn default_encoding() -> String {
    "shift_jis".to_string()
}

fn default_true() -> bool {
    true
}

/// Configuration for a [`PageFetcher`](crate::PageFetcher)
///
/// Immutable once handed to the fetcher. All fields have serde defaults, so
/// a partial TOML/JSON document (or `FetchConfig::default()`) yields a
/// working configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in milliseconds (default: 30000)
    ///
    /// The timer runs from dispatch until the terminal outcome. If it fires
    /// first, the in-flight request is aborted and the fetch reports a
    /// timeout failure.
    #[serde(default = "default_timeout_millis")]
    pub timeout_millis: u64,

    /// Requested character encoding (default: `"shift_jis"`)
    ///
    /// Recognized identifiers, case-insensitive: `shift_jis` / `shift-jis`,
    /// `utf-8` / `utf8`, `euc-jp`. Anything else decodes through the
    /// Shift-JIS-then-UTF-8 fallback chain.
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Destination file for the decoded text (`None` = do not persist)
    #[serde(default)]
    pub destination: Option<PathBuf>,

    /// Create missing destination parent directories (default: true)
    #[serde(default = "default_true")]
    pub auto_create_dir: bool,

    /// Override for the fixed User-Agent header (`None` = built-in profile)
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_millis: default_timeout_millis(),
            encoding: default_encoding(),
            destination: None,
            auto_create_dir: true,
            user_agent: None,
        }
    }
}

impl FetchConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the timeout is zero or a destination
    /// is set to an empty path.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_millis == 0 {
            return Err(Error::Config {
                message: "timeout_millis must be greater than zero".to_string(),
                key: Some("timeout_millis".to_string()),
            });
        }

        if let Some(destination) = &self.destination
            && destination.as_os_str().is_empty()
        {
            return Err(Error::Config {
                message: "destination path is empty".to_string(),
                key: Some("destination".to_string()),
            });
        }

        Ok(())
    }

    /// The configured timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}
