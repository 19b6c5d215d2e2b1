//! CollectCounters: builds the outbound report and evicts timed-out terminals.
//!
//! One pass walks the registry in MAC order:
//!
//! ```text
//! for each terminal:
//!     not authenticated?  → skip
//!     append {ip, mac, token, uptime, incoming, outgoing} to the report
//!     timeout pending?    → logout notification, then remove from registry
//! ```
//!
//! A timed-out terminal is therefore reported exactly once more (its final
//! counters) before it disappears, whatever the auth server answers later.
//!
//! The walk uses [`TerminalRegistry::cursor`], so removing the terminal that
//! was just visited does not disturb the rest of the traversal.

use portal_core::{CounterEntry, CounterReport, TerminalRegistry};
use tracing::{debug, info};

use super::collaborators::{AuthClient, AuthRequestKind};

/// Builds the counters report for `now` (Unix seconds) and applies timeout
/// evictions to `registry`.
///
/// Evictions are complete when this returns, before the report is encoded
/// or sent.  Unauthenticated terminals are neither reported nor evicted, even
/// if flagged for timeout.
pub fn collect_counters(
    registry: &mut TerminalRegistry,
    now: u64,
    auth: &dyn AuthClient,
) -> CounterReport {
    let mut report = CounterReport::default();
    let mut cursor = registry.cursor();

    while let Some(mac) = registry.next_key(&mut cursor) {
        let Some(term) = registry.find(&mac) else {
            continue;
        };
        if !term.authenticated {
            continue;
        }

        report.counters.push(CounterEntry::from_terminal(term, now));

        if term.timeout_pending {
            info!("counters: terminal {} ({}) timed out; logging out", term.mac, term.ip);
            auth.request(AuthRequestKind::Logout, &term.ip, &term.mac, &term.token);
            registry.remove(&mac);
        }
    }

    debug!(
        "counters: collected {} terminal(s), {} remain registered",
        report.len(),
        registry.len()
    );
    report
}
