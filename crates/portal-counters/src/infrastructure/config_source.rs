//! Live, reloadable reporter configuration.
//!
//! The scheduler calls [`ConfigSource::snapshot`] once per fire, so anything
//! stored with [`SharedConfig::replace`] takes effect on the next cycle
//! without restarting the reporter.

use std::sync::{Arc, PoisonError, RwLock};

use crate::application::ConfigSource;
use crate::domain::{CountersConfig, InvalidConfig};

/// Cloneable handle to the current [`CountersConfig`].
///
/// Every clone shares the same value.  Only validated configurations are
/// ever stored.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    inner: Arc<RwLock<CountersConfig>>,
}

impl SharedConfig {
    /// Wraps `config` after validating it.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvalidConfig`] reason if `config` is rejected.
    pub fn new(config: CountersConfig) -> Result<Self, InvalidConfig> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(RwLock::new(config)),
        })
    }

    /// Replaces the current configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`] and keeps the previous value if `config` is
    /// rejected.
    pub fn replace(&self, config: CountersConfig) -> Result<(), InvalidConfig> {
        config.validate()?;
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }
}

impl ConfigSource for SharedConfig {
    fn snapshot(&self) -> CountersConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
