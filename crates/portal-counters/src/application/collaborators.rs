//! Traits for everything the counters use cases talk to.
//!
//! The use cases in this layer never open sockets or read files.  They are
//! handed implementations of these traits at construction time: the
//! infrastructure layer provides the real ones (reqwest, TOML, system clock)
//! and tests provide mocks or recording fakes.

use std::sync::Arc;

use async_trait::async_trait;
use portal_core::TerminalRegistry;
use tokio::sync::Mutex;

use crate::domain::CountersConfig;

/// The process-wide terminal registry behind its exclusive-access guard.
///
/// Every reader and writer (collector, response handler, upstream admission)
/// locks it for one short pass and never holds it across network I/O.
pub type SharedRegistry = Arc<Mutex<TerminalRegistry>>;

/// Creates an empty [`SharedRegistry`].
pub fn shared_registry() -> SharedRegistry {
    Arc::new(Mutex::new(TerminalRegistry::new()))
}

/// Source of the reporter configuration, polled once per cycle.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigSource: Send + Sync {
    /// Returns the current, validated configuration.
    fn snapshot(&self) -> CountersConfig;
}

/// Wall clock in Unix seconds.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> u64;
}

/// Kind of request sent to the auth server on behalf of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequestKind {
    Logout,
}

impl AuthRequestKind {
    /// The `stage` query value for this request.
    pub fn stage(self) -> &'static str {
        match self {
            AuthRequestKind::Logout => "logout",
        }
    }
}

/// Sends per-terminal notifications to the auth server.
///
/// Calls are fire-and-forget: implementations must return immediately and
/// deliver the request in the background.  The caller observes no result.
#[cfg_attr(test, mockall::automock)]
pub trait AuthClient: Send + Sync {
    fn request(&self, kind: AuthRequestKind, ip: &str, mac: &str, token: &str);
}

/// Posts a document to the auth server.
///
/// Completes exactly once per call: with the response body on success, or
/// `None` when the request failed for any reason (connect error, timeout,
/// non-success status, unreadable body).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportTransport: Send + Sync {
    async fn post(&self, url: &str, body: String) -> Option<String>;
}
