//! CountersScheduler: the self-rearming timer that drives report cycles.
//!
//! # State machine
//!
//! ```text
//!           start()                fire                 cycle spawned
//!   Idle ──────────────► Armed ──────────► Firing ──────────────────► Armed
//!    ▲                     │                                            │
//!    └──────── stop() ─────┴────────────────────────────────────────────┘
//! ```
//!
//! The first fire happens immediately after `start()`.  On every fire the
//! loop:
//!
//! 1. reads a fresh [`CountersConfig`](crate::domain::CountersConfig)
//!    snapshot, so configuration changes apply from the next fire on;
//! 2. waits for the previous cycle if its exchange is still in flight, so
//!    cycles never overlap;
//! 3. fixes the next deadline at `cycle start + interval`, *before* running
//!    anything that could fail;
//! 4. spawns the cycle as its own task.  An error or even a panic inside the
//!    cycle is contained in that task and cannot stop the loop.
//!
//! # Stopping
//!
//! `stop()` signals the loop through a `watch` channel and bumps a
//! generation counter.  It never aborts a request already in flight: that
//! cycle still runs to completion, sees the bumped generation, and discards
//! its reply instead of touching the registry.  Dropping every
//! [`CountersScheduler`] handle has the same effect on the loop as `stop()`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::collaborators::ConfigSource;
use super::handle_response::HandleOutcome;
use super::report_cycle::{run_cycle, CountersContext, CycleError};

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not running; no fire is pending.
    Idle,
    /// Waiting for the next fire.
    Armed,
    /// Collecting and dispatching a cycle.
    Firing,
}

struct Control {
    state: SchedulerState,
    stop_tx: Option<watch::Sender<bool>>,
}

struct Inner {
    ctx: CountersContext,
    config: Arc<dyn ConfigSource>,
    generation: Arc<AtomicU64>,
    control: Mutex<Control>,
}

impl Inner {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Updates the state unless the loop that asks has been stopped.
    fn set_state_if_current(&self, generation: u64, state: SchedulerState) {
        let mut control = self.control();
        if self.generation.load(Ordering::SeqCst) == generation {
            control.state = state;
        }
    }
}

/// Drives periodic counters reports.
///
/// Cloning is cheap and every clone controls the same scheduler, so a clone
/// can be handed to whatever needs to call [`CountersScheduler::stop`],
/// including code running inside a cycle.
#[derive(Clone)]
pub struct CountersScheduler {
    inner: Arc<Inner>,
}

impl CountersScheduler {
    pub fn new(ctx: CountersContext, config: Arc<dyn ConfigSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                config,
                generation: Arc::new(AtomicU64::new(0)),
                control: Mutex::new(Control {
                    state: SchedulerState::Idle,
                    stop_tx: None,
                }),
            }),
        }
    }

    /// Current state of the scheduler.
    pub fn state(&self) -> SchedulerState {
        self.inner.control().state
    }

    /// Current generation.  Incremented by every effective [`Self::stop`].
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Arms the scheduler with an immediate first fire.
    ///
    /// Does nothing if the scheduler is already running.  Must be called
    /// from within a Tokio runtime.
    pub fn start(&self) {
        let mut control = self.inner.control();
        if control.stop_tx.is_some() {
            debug!("counters: scheduler already running");
            return;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        control.stop_tx = Some(stop_tx);
        control.state = SchedulerState::Armed;
        let generation = self.inner.generation.load(Ordering::SeqCst);
        drop(control);

        info!("counters: scheduler started");
        tokio::spawn(run_loop(Arc::downgrade(&self.inner), generation, stop_rx));
    }

    /// Cancels any pending fire and returns to [`SchedulerState::Idle`].
    ///
    /// Safe to call at any time, repeatedly, and from inside a cycle.
    /// In-flight requests are not cancelled; their replies are discarded.
    pub fn stop(&self) {
        let mut control = self.inner.control();
        let Some(stop_tx) = control.stop_tx.take() else {
            return;
        };
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        control.state = SchedulerState::Idle;
        drop(control);

        // The loop may already be gone; a closed channel is fine.
        let _ = stop_tx.send(true);
        info!("counters: scheduler stopped");
    }
}

// ── Loop ──────────────────────────────────────────────────────────────────────

/// The loop only holds a weak handle between fires.  Once every
/// [`CountersScheduler`] clone is dropped the stop sender goes with them, the
/// channel closes and the loop exits.
async fn run_loop(weak: Weak<Inner>, generation: u64, mut stop_rx: watch::Receiver<bool>) {
    let mut next_fire = Instant::now();
    let mut in_flight: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            biased;
            _ = stop_rx.changed() => break,
            _ = tokio::time::sleep_until(next_fire) => {}
        }
        let Some(inner) = weak.upgrade() else {
            break;
        };

        inner.set_state_if_current(generation, SchedulerState::Firing);
        let config = inner.config.snapshot();

        if let Some(previous) = in_flight.take() {
            if !previous.is_finished() {
                warn!("counters: previous report still in flight; delaying this cycle");
            }
            tokio::select! {
                biased;
                _ = stop_rx.changed() => break,
                joined = previous => log_join(joined),
            }
        }

        // Counted from the actual start of this cycle, so a delayed cycle
        // is never followed by an immediate one.
        next_fire = Instant::now() + config.check_interval();

        let ctx = inner.ctx.clone();
        let current = Arc::clone(&inner.generation);
        in_flight = Some(tokio::spawn(async move {
            let result = run_cycle(&ctx, &config, generation, &current).await;
            log_cycle(result);
        }));

        inner.set_state_if_current(generation, SchedulerState::Armed);
    }

    debug!("counters: scheduler loop exited (generation {generation})");
}

fn log_cycle(result: Result<HandleOutcome, CycleError>) {
    match result {
        Ok(HandleOutcome::Applied { denied }) if denied > 0 => {
            info!("counters: cycle complete, {denied} terminal(s) revoked");
        }
        Ok(outcome) => debug!("counters: cycle complete ({outcome:?})"),
        Err(e) => error!("counters: cycle failed: {e}"),
    }
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!("counters: cycle task aborted: {e}");
    }
}
