//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the reporter's TOML file at startup and on
//! every reload signal, falling back to defaults when the file is absent.

pub mod config;

pub use config::{load_config, save_config, ConfigError};
