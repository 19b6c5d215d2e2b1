//! JSON documents exchanged with the auth server during a counters cycle.
//!
//! # Outbound: the counters report
//!
//! Posted to `<auth_url>&stage=counters` once per cycle:
//!
//! ```json
//! {"counters":[{"ip":"10.0.0.2","mac":"AA:BB","token":"t","uptime":60,"incoming":100,"outgoing":200}]}
//! ```
//!
//! # Inbound: the auth server response
//!
//! ```json
//! {"resp":[{"mac":"AA:BB","auth":0}]}
//! ```
//!
//! `auth == 0` ([`DENY_CODE`]) revokes the terminal.  Any other value, or a
//! missing `auth`, means "no action".  Entries without a `mac` are skipped.

use serde::{Deserialize, Serialize};

use crate::domain::terminal::Terminal;

/// Stage marker appended to the auth URL for counters reports.
pub const COUNTERS_STAGE: &str = "counters";

/// `auth` value meaning "revoke this session now".
pub const DENY_CODE: i32 = 0;

/// Appends a stage marker to the configured auth URL.
///
/// The auth URL already carries the gateway's query string
/// (e.g. `http://auth/wifidog/auth?gw_id=gw1`), so the stage is added as
/// another `&`-separated parameter.
pub fn stage_url(auth_url: &str, stage: &str) -> String {
    format!("{auth_url}&stage={stage}")
}

// ── Outbound ──────────────────────────────────────────────────────────────────

/// One terminal's line in a counters report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterEntry {
    pub ip: String,
    pub mac: String,
    pub token: String,
    /// Seconds since the terminal authenticated.
    pub uptime: u32,
    /// Bytes received from the terminal (its `rx`).
    pub incoming: u32,
    /// Bytes sent to the terminal (its `tx`).
    pub outgoing: u32,
}

impl CounterEntry {
    /// Builds the report line for `term` as of `now` (Unix seconds).
    ///
    /// Counters wider than 32 bits saturate at `u32::MAX` so the reported
    /// values stay non-decreasing.
    pub fn from_terminal(term: &Terminal, now: u64) -> Self {
        Self {
            ip: term.ip.clone(),
            mac: term.mac.clone(),
            token: term.token.clone(),
            uptime: term.uptime(now),
            incoming: saturate_u32(term.rx),
            outgoing: saturate_u32(term.tx),
        }
    }
}

fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// The full outbound document: every authenticated terminal, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterReport {
    pub counters: Vec<CounterEntry>,
}

impl CounterReport {
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

// ── Inbound ───────────────────────────────────────────────────────────────────

/// The auth server's verdict for one MAC.
///
/// Both fields are optional on the wire; see the module docs for how each
/// combination is treated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthVerdict {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<i32>,
}

impl AuthVerdict {
    /// Returns the MAC to revoke, if this verdict is a deny.
    pub fn denied_mac(&self) -> Option<&str> {
        match (&self.mac, self.auth) {
            (Some(mac), Some(DENY_CODE)) => Some(mac.as_str()),
            _ => None,
        }
    }
}

/// The full inbound document.
///
/// `resp` is required: a body without it is treated as malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthServerResponse {
    pub resp: Vec<AuthVerdict>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(mac: Option<&str>, auth: Option<i32>) -> AuthVerdict {
        AuthVerdict {
            mac: mac.map(str::to_string),
            auth,
        }
    }

    #[test]
    fn test_from_terminal_copies_identity_and_counters() {
        // Arrange
        let mut term = Terminal::new("AA:BB", "10.0.0.2", "tok");
        term.authenticate(1_000);
        term.rx = 100;
        term.tx = 200;

        // Act
        let entry = CounterEntry::from_terminal(&term, 1_060);

        // Assert
        assert_eq!(
            entry,
            CounterEntry {
                ip: "10.0.0.2".to_string(),
                mac: "AA:BB".to_string(),
                token: "tok".to_string(),
                uptime: 60,
                incoming: 100,
                outgoing: 200,
            }
        );
    }

    #[test]
    fn test_from_terminal_saturates_wide_counters() {
        let mut term = Terminal::new("AA:BB", "10.0.0.2", "tok");
        term.rx = u64::from(u32::MAX) + 10;
        let entry = CounterEntry::from_terminal(&term, 0);
        assert_eq!(entry.incoming, u32::MAX);
        assert_eq!(entry.outgoing, 0);
    }

    #[test]
    fn test_denied_mac_only_for_zero_code() {
        assert_eq!(verdict(Some("AA:BB"), Some(0)).denied_mac(), Some("AA:BB"));
        assert_eq!(verdict(Some("AA:BB"), Some(1)).denied_mac(), None);
        assert_eq!(verdict(Some("AA:BB"), Some(-1)).denied_mac(), None);
        assert_eq!(verdict(Some("AA:BB"), None).denied_mac(), None);
        assert_eq!(verdict(None, Some(0)).denied_mac(), None);
    }

    #[test]
    fn test_stage_url_appends_counters_stage() {
        assert_eq!(
            stage_url("http://auth.example/wifidog/auth?gw_id=gw1", COUNTERS_STAGE),
            "http://auth.example/wifidog/auth?gw_id=gw1&stage=counters"
        );
    }

    #[test]
    fn test_report_len_tracks_entries() {
        let report = CounterReport::default();
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
    }
}
