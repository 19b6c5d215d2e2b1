//! TOML-based configuration persistence for the counters reporter.
//!
//! ```toml
//! check_interval_secs = 60
//! auth_url = "http://auth.example.net/wifidog/auth?gw_id=gw1"
//! request_timeout_secs = 10
//! log_level = "info"
//! ```
//!
//! Any field may be omitted; a missing file loads as
//! [`CountersConfig::default()`].

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{CountersConfig, InvalidConfig};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The file parsed but holds unusable values.
    #[error("invalid config: {0}")]
    Invalid(#[from] InvalidConfig),
}

/// Loads and validates the configuration at `path`, returning
/// `CountersConfig::default()` if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] if the TOML is malformed and
/// [`ConfigError::Invalid`] if validation fails.
pub fn load_config(path: &Path) -> Result<CountersConfig, ConfigError> {
    let cfg = match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str::<CountersConfig>(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CountersConfig::default(),
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &CountersConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unique scratch directory under the system temp dir.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "portal-counters-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = scratch_dir("missing");
        let cfg = load_config(&dir.join("counters.toml")).unwrap();
        assert_eq!(cfg, CountersConfig::default());
    }

    #[test]
    fn test_save_then_load_restores_config() {
        // Arrange
        let dir = scratch_dir("roundtrip");
        let path = dir.join("nested").join("counters.toml");
        let cfg = CountersConfig {
            check_interval_secs: 30,
            auth_url: "http://auth.example.net/wifidog/auth?gw_id=gw1".to_string(),
            ..CountersConfig::default()
        };

        // Act
        save_config(&path, &cfg).unwrap();
        let restored = load_config(&path).unwrap();

        // Assert
        assert_eq!(restored, cfg);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = scratch_dir("partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("counters.toml");
        std::fs::write(&path, "check_interval_secs = 5\n").unwrap();

        let cfg = load_config(&path).unwrap();

        assert_eq!(cfg.check_interval_secs, 5);
        assert_eq!(cfg.request_timeout_secs, 10);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = scratch_dir("malformed");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("counters.toml");
        std::fs::write(&path, "check_interval_secs = \"soon\"\n").unwrap();

        let result = load_config(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_zero_interval_file_is_rejected() {
        let dir = scratch_dir("zero");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("counters.toml");
        std::fs::write(&path, "check_interval_secs = 0\n").unwrap();

        let result = load_config(&path);

        assert!(matches!(
            result,
            Err(ConfigError::Invalid(InvalidConfig::ZeroCheckInterval))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
