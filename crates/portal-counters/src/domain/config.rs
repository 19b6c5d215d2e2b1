//! Counters reporter configuration types.
//!
//! [`CountersConfig`] is the single source of truth for every runtime setting
//! of the reporter.  It is a plain serde struct: the infrastructure layer
//! reads it from a TOML file and the application layer only ever sees a
//! validated snapshot through `ConfigSource`.
//!
//! # Serde default values
//!
//! Every field has a `#[serde(default = "...")]` helper so a config file may
//! omit any setting, and an empty file is a valid (default) configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a [`CountersConfig`] is rejected by [`CountersConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidConfig {
    #[error("check_interval_secs must be greater than zero")]
    ZeroCheckInterval,
    #[error("request_timeout_secs must be greater than zero")]
    ZeroRequestTimeout,
    #[error("auth_url cannot be empty")]
    EmptyAuthUrl,
}

/// All runtime configuration for the counters reporter.
///
/// # Example
///
/// ```rust
/// use portal_counters::domain::CountersConfig;
///
/// let cfg = CountersConfig::default();
/// assert_eq!(cfg.check_interval().as_secs(), 60);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountersConfig {
    /// Seconds between two counters reports.  Re-read before every cycle.
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// Auth server endpoint, including the gateway query string.
    ///
    /// Stages are appended as `&stage=<stage>`, so this URL must already
    /// contain a `?`.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Timeout applied by the HTTP client to every auth server request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// `tracing` log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_check_interval() -> u64 {
    60
}
fn default_auth_url() -> String {
    "http://127.0.0.1:8080/wifidog/auth?gw_id=default".to_string()
}
fn default_request_timeout() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CountersConfig {
    /// | Field                | Default                                              |
    /// |----------------------|------------------------------------------------------|
    /// | check_interval_secs  | `60`                                                 |
    /// | auth_url             | `http://127.0.0.1:8080/wifidog/auth?gw_id=default`   |
    /// | request_timeout_secs | `10`                                                 |
    /// | log_level            | `"info"`                                             |
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval(),
            auth_url: default_auth_url(),
            request_timeout_secs: default_request_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl CountersConfig {
    /// Checks the invariants the reporter relies on.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvalidConfig`] violation found.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.check_interval_secs == 0 {
            return Err(InvalidConfig::ZeroCheckInterval);
        }
        if self.request_timeout_secs == 0 {
            return Err(InvalidConfig::ZeroRequestTimeout);
        }
        if self.auth_url.trim().is_empty() {
            return Err(InvalidConfig::EmptyAuthUrl);
        }
        Ok(())
    }

    /// The report interval as a [`Duration`].  Never zero.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs.max(1))
    }

    /// The per-request HTTP timeout as a [`Duration`].  Never zero.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
