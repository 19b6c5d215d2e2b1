//! portal-counters library crate.
//!
//! Periodically reports per-terminal traffic counters of a captive-portal
//! gateway to its auth server and revokes the terminals the server denies.
//!
//! # Architecture
//!
//! ```text
//! [portal-counters]
//!   ├── domain/           CountersConfig and its validation
//!   ├── application/      collect, handle-response, report cycle, scheduler
//!   └── infrastructure/
//!         ├── http_transport   POST to the auth server (reqwest)
//!         ├── auth_client      logout notifications (reqwest)
//!         ├── config_source    live, reloadable configuration
//!         ├── clock            system wall clock
//!         └── storage/         TOML config file
//!         ↕
//! auth server  (JSON over HTTP)
//! ```
//!
//! The terminal registry itself and the wire documents live in
//! `portal-core`, which other gateway components share.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: the report cycle and its scheduler.
pub mod application;

/// Infrastructure layer: HTTP, configuration files and the clock.
pub mod infrastructure;
