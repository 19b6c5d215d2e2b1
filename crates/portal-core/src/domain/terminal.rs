//! Terminal sessions and the ordered registry that owns them.
//!
//! A *terminal* is one client device that has been admitted by the gateway.
//! It is identified by its MAC address for as long as it stays in the
//! registry, and it carries the traffic counters that the counters reporter
//! periodically sends to the auth server.
//!
//! # Why a `BTreeMap`? (for beginners)
//!
//! The reporter must walk the registry in a deterministic, stable order and
//! may remove the entry it is currently looking at (a terminal that timed
//! out, for example).  A `BTreeMap` keeps keys sorted, so iteration order is
//! always ascending MAC order, and its `range` API lets us resume a walk
//! *strictly after* the last visited key.  That is exactly what
//! [`RegistryCursor`] does, which makes "remove while iterating" well-defined:
//!
//! ```text
//! keys:    AA  BB  CC  DD
//! visit:   AA → BB (remove BB) → resume after "BB" → CC → DD
//! ```
//!
//! Removing the just-visited key never skips or repeats another entry,
//! because the cursor does not hold a borrow into the map; it only remembers
//! the last key it handed out.

use std::collections::BTreeMap;
use std::ops::Bound;

/// One admitted client session, keyed by MAC address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    /// MAC address in the gateway's canonical string form.
    pub mac: String,
    /// IPv4/IPv6 address currently leased to the terminal.
    pub ip: String,
    /// Token handed out by the auth server at login.
    pub token: String,
    /// Unix timestamp (seconds) of the successful authentication.
    pub auth_time: u64,
    /// Bytes received from the terminal.  Never decreases.
    pub rx: u64,
    /// Bytes sent to the terminal.  Never decreases.
    pub tx: u64,
    /// Set once the auth server has accepted the terminal.
    pub authenticated: bool,
    /// Set when the terminal went idle; it is reported once more and evicted.
    pub timeout_pending: bool,
}

impl Terminal {
    /// Creates an unauthenticated terminal with zeroed counters.
    pub fn new(mac: impl Into<String>, ip: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            mac: mac.into(),
            ip: ip.into(),
            token: token.into(),
            auth_time: 0,
            rx: 0,
            tx: 0,
            authenticated: false,
            timeout_pending: false,
        }
    }

    /// Marks the terminal as authenticated at `auth_time` (Unix seconds).
    pub fn authenticate(&mut self, auth_time: u64) {
        self.authenticated = true;
        self.auth_time = auth_time;
    }

    /// Seconds elapsed since authentication, clamped into `u32`.
    ///
    /// A clock that moved backwards yields `0` rather than wrapping.
    pub fn uptime(&self, now: u64) -> u32 {
        u32::try_from(now.saturating_sub(self.auth_time)).unwrap_or(u32::MAX)
    }
}

// ── Cursor ────────────────────────────────────────────────────────────────────

/// Position of an in-progress registry walk.
///
/// Obtain one with [`TerminalRegistry::cursor`] and advance it with
/// [`TerminalRegistry::next_key`].  The cursor stores only the last key it
/// returned, so the registry may be mutated freely between steps.
#[derive(Debug, Default, Clone)]
pub struct RegistryCursor {
    last: Option<String>,
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// In-memory registry of all terminals, ordered by MAC address.
///
/// The registry itself is not synchronised.  Services share it behind an
/// exclusive-access guard (see `portal_counters::SharedRegistry`) and hold
/// the guard for one pass at a time.
#[derive(Debug, Default)]
pub struct TerminalRegistry {
    terminals: BTreeMap<String, Terminal>,
}

impl TerminalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a terminal, replacing any existing entry with the same MAC.
    ///
    /// Returns the replaced entry, if any.
    pub fn insert(&mut self, terminal: Terminal) -> Option<Terminal> {
        self.terminals.insert(terminal.mac.clone(), terminal)
    }

    /// Looks up a terminal by MAC.
    pub fn find(&self, mac: &str) -> Option<&Terminal> {
        self.terminals.get(mac)
    }

    /// Removes a terminal by MAC and returns it.
    pub fn remove(&mut self, mac: &str) -> Option<Terminal> {
        self.terminals.remove(mac)
    }

    pub fn len(&self) -> usize {
        self.terminals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terminals.is_empty()
    }

    /// Iterates terminals in ascending MAC order.
    ///
    /// This borrows the registry; use [`Self::cursor`] when the walk needs to
    /// remove entries.
    pub fn iter(&self) -> impl Iterator<Item = &Terminal> {
        self.terminals.values()
    }

    /// Raises the traffic counters of a terminal.
    ///
    /// Counters are monotonic: a sample lower than the stored value is
    /// ignored for that direction.  Returns `false` if the MAC is unknown.
    pub fn update_counters(&mut self, mac: &str, rx: u64, tx: u64) -> bool {
        match self.terminals.get_mut(mac) {
            Some(term) => {
                term.rx = term.rx.max(rx);
                term.tx = term.tx.max(tx);
                true
            }
            None => false,
        }
    }

    /// Flags a terminal for eviction after its next report.
    ///
    /// Returns `false` if the MAC is unknown.
    pub fn mark_timeout(&mut self, mac: &str) -> bool {
        match self.terminals.get_mut(mac) {
            Some(term) => {
                term.timeout_pending = true;
                true
            }
            None => false,
        }
    }

    /// Starts a removal-safe walk from the first (lowest) MAC.
    pub fn cursor(&self) -> RegistryCursor {
        RegistryCursor::default()
    }

    /// Advances `cursor` and returns the next MAC in order, if any.
    ///
    /// The key is returned by value so no borrow of the registry outlives the
    /// call; the caller may then look the terminal up, and remove it, before
    /// advancing again.
    pub fn next_key(&self, cursor: &mut RegistryCursor) -> Option<String> {
        let lower = match cursor.last.as_deref() {
            Some(last) => Bound::Excluded(last),
            None => Bound::Unbounded,
        };
        let next = self
            .terminals
            .range::<str, _>((lower, Bound::Unbounded))
            .next()
            .map(|(mac, _)| mac.clone())?;
        cursor.last = Some(next.clone());
        Some(next)
    }
}
