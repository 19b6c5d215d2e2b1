//! Domain layer for portal-counters.
//!
//! Pure configuration types with no I/O.  The terminal and protocol types
//! live in `portal-core` because other gateway services share them.

pub mod config;

pub use config::{CountersConfig, InvalidConfig};
