//! Domain entities for the portal gateway.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies: the terminal session record and the registry that owns all
//! live sessions.  Code in outer layers (application, infrastructure) depends
//! on the domain, but the domain never depends on them.

/// Terminal sessions and the MAC-ordered registry.
///
/// See [`terminal::TerminalRegistry`] for the main type.
pub mod terminal;
