//! Application layer for portal-counters.
//!
//! The use cases here decide *what* happens on every report cycle and leave
//! *how* (HTTP, files, clocks) to the infrastructure layer behind the traits
//! in [`collaborators`].
//!
//! # Responsibilities
//!
//! - Building the counters report and evicting timed-out terminals
//! - Applying the auth server's deny verdicts
//! - Sequencing one collect, send and handle round trip
//! - Driving cycles on a self-rearming timer that can be stopped at any time

pub mod collaborators;
pub mod collect_counters;
pub mod handle_response;
pub mod report_cycle;
pub mod scheduler;

pub use collaborators::{
    shared_registry, AuthClient, AuthRequestKind, Clock, ConfigSource, ReportTransport,
    SharedRegistry,
};
pub use collect_counters::collect_counters;
pub use handle_response::{handle_response, HandleOutcome};
pub use report_cycle::{run_cycle, CountersContext, CycleError};
pub use scheduler::{CountersScheduler, SchedulerState};
