//! Infrastructure layer for portal-counters.
//!
//! Real implementations of the application traits:
//!
//! - [`HttpTransport`] posts reports with `reqwest`
//! - [`HttpAuthClient`] sends fire-and-forget logout requests
//! - [`SharedConfig`] holds the live configuration and accepts reloads
//! - [`SystemClock`] reads the wall clock
//! - [`storage`] loads and saves the TOML configuration file

pub mod auth_client;
pub mod clock;
pub mod config_source;
pub mod http_transport;
pub mod storage;

pub use auth_client::HttpAuthClient;
pub use clock::SystemClock;
pub use config_source::SharedConfig;
pub use http_transport::{HttpTransport, TransportError};

#[cfg(test)]
mod test_server;
