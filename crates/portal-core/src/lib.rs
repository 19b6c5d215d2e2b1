//! # portal-core
//!
//! Shared library for the portal gateway containing the terminal registry
//! and the counters protocol documents with their JSON codec.
//!
//! It has zero dependencies on sockets, async runtimes, or the file system,
//! so everything here can be unit-tested in isolation.
//!
//! # Architecture overview (for beginners)
//!
//! The gateway admits client devices ("terminals") after they authenticate
//! against a remote auth server.  While a terminal is online, the gateway
//! periodically tells the auth server how long it has been connected and how
//! much traffic it used; the server may answer by revoking the terminal.
//!
//! This crate is the shared foundation.  It defines:
//!
//! - **`domain`** – The [`Terminal`] session record and the ordered
//!   [`TerminalRegistry`] that supports removing entries while walking it.
//!
//! - **`protocol`** – The JSON documents exchanged with the auth server
//!   ([`CounterReport`] out, [`AuthServerResponse`] in) and the codec that
//!   converts them to and from text.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `portal_core::TerminalRegistry` instead of the full module path.
pub use domain::terminal::{RegistryCursor, Terminal, TerminalRegistry};
pub use protocol::codec::{decode_report, decode_response, encode_report, ProtocolError};
pub use protocol::messages::{
    stage_url, AuthServerResponse, AuthVerdict, CounterEntry, CounterReport, COUNTERS_STAGE,
    DENY_CODE,
};
