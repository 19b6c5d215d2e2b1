//! ReportCycle: one collect → send → handle-response round trip.
//!
//! ```text
//! lock registry ─► collect_counters (evictions applied) ─► encode ─► unlock
//!                                                                       │
//!                   POST <auth_url>&stage=counters  ◄───────────────────┘
//!                                   │
//!                   (stopped meanwhile?) ── yes ──► discard as Stale
//!                                   │ no
//! lock registry ─► handle_response ─► unlock
//! ```
//!
//! The registry guard is never held while the POST is in flight, so other
//! registry users (admission, counter updates) are never blocked by a slow
//! auth server.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use portal_core::{encode_report, stage_url, ProtocolError, COUNTERS_STAGE};
use thiserror::Error;
use tracing::debug;

use super::collaborators::{AuthClient, Clock, ReportTransport, SharedRegistry};
use super::collect_counters::collect_counters;
use super::handle_response::{handle_response, HandleOutcome};
use crate::domain::CountersConfig;

/// Errors that abort a single cycle.  The scheduler logs them and rearms.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The report could not be encoded, so nothing was sent.
    #[error("counters report not sent: {0}")]
    Encode(#[from] ProtocolError),
}

/// Everything a report cycle needs, bundled for cheap cloning into tasks.
#[derive(Clone)]
pub struct CountersContext {
    pub registry: SharedRegistry,
    pub transport: Arc<dyn ReportTransport>,
    pub auth: Arc<dyn AuthClient>,
    pub clock: Arc<dyn Clock>,
}

/// Runs one report cycle with the configuration snapshot taken at fire time.
///
/// `generation` is the scheduler generation the cycle was fired under and
/// `current` the scheduler's live counter; when they differ the scheduler
/// has been stopped and the cycle leaves the registry alone.
///
/// # Errors
///
/// Returns [`CycleError::Encode`] if the report could not be serialized.
/// Timeout evictions made during collection stay applied in that case.
pub async fn run_cycle(
    ctx: &CountersContext,
    config: &CountersConfig,
    generation: u64,
    current: &AtomicU64,
) -> Result<HandleOutcome, CycleError> {
    let body = {
        let mut registry = ctx.registry.lock().await;
        if current.load(Ordering::SeqCst) != generation {
            debug!("counters: reporter stopped before collection; skipping cycle");
            return Ok(HandleOutcome::Stale);
        }
        let report = collect_counters(&mut registry, ctx.clock.now_unix(), ctx.auth.as_ref());
        encode_report(&report)?
    };

    let url = stage_url(&config.auth_url, COUNTERS_STAGE);
    let reply = ctx.transport.post(&url, body).await;

    let mut registry = ctx.registry.lock().await;
    if current.load(Ordering::SeqCst) != generation {
        debug!("counters: response arrived after reporter stopped; discarding");
        return Ok(HandleOutcome::Stale);
    }
    Ok(handle_response(reply.as_deref(), &mut registry, ctx.auth.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::collaborators::{
        shared_registry, AuthRequestKind, MockAuthClient, MockReportTransport,
    };
    use portal_core::{decode_report, Terminal};
    use tokio_test::assert_ok;

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now_unix(&self) -> u64 {
            self.0
        }
    }

    const T: u64 = 1_700_000_000;

    fn config() -> CountersConfig {
        CountersConfig {
            auth_url: "http://auth.test/wifidog/auth?gw_id=gw1".to_string(),
            ..CountersConfig::default()
        }
    }

    fn context(transport: MockReportTransport, auth: MockAuthClient) -> CountersContext {
        CountersContext {
            registry: shared_registry(),
            transport: Arc::new(transport),
            auth: Arc::new(auth),
            clock: Arc::new(FixedClock(T + 60)),
        }
    }

    async fn insert_authed(ctx: &CountersContext, mac: &str, timeout: bool) {
        let mut term = Terminal::new(mac, "10.0.0.2", "tok");
        term.authenticate(T);
        term.rx = 100;
        term.tx = 200;
        term.timeout_pending = timeout;
        ctx.registry.lock().await.insert(term);
    }

    #[tokio::test]
    async fn test_cycle_posts_report_to_counters_stage() {
        // Arrange
        let mut transport = MockReportTransport::new();
        transport
            .expect_post()
            .withf(|url, body| {
                let report = decode_report(body).unwrap();
                url.to_string() == "http://auth.test/wifidog/auth?gw_id=gw1&stage=counters"
                    && report.len() == 1
                    && report.counters[0].mac == "AA:BB"
                    && report.counters[0].uptime == 60
            })
            .times(1)
            .returning(|_, _| Some(r#"{"resp":[]}"#.to_string()));
        let ctx = context(transport, MockAuthClient::new());
        insert_authed(&ctx, "AA:BB", false).await;

        // Act
        let outcome = run_cycle(&ctx, &config(), 0, &AtomicU64::new(0)).await;

        // Assert
        assert_eq!(assert_ok!(outcome), HandleOutcome::Applied { denied: 0 });
        assert_eq!(ctx.registry.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_cycle_applies_deny_from_reply() {
        let mut transport = MockReportTransport::new();
        transport
            .expect_post()
            .returning(|_, _| Some(r#"{"resp":[{"mac":"AA:BB","auth":0}]}"#.to_string()));
        let mut auth = MockAuthClient::new();
        auth.expect_request()
            .withf(|kind, _, mac, _| *kind == AuthRequestKind::Logout && mac.to_string() == "AA:BB")
            .times(1)
            .return_const(());
        let ctx = context(transport, auth);
        insert_authed(&ctx, "AA:BB", false).await;

        let outcome = run_cycle(&ctx, &config(), 3, &AtomicU64::new(3)).await.unwrap();

        assert_eq!(outcome, HandleOutcome::Applied { denied: 1 });
        assert!(ctx.registry.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_timed_out_terminal_also_denied_gets_one_logout() {
        // Arrange: AA:BB is evicted during collection, then denied by the reply
        let mut transport = MockReportTransport::new();
        transport
            .expect_post()
            .withf(|_, body| decode_report(body).unwrap().counters[0].mac == "AA:BB")
            .times(1)
            .returning(|_, _| Some(r#"{"resp":[{"mac":"AA:BB","auth":0}]}"#.to_string()));
        let mut auth = MockAuthClient::new();
        auth.expect_request()
            .withf(|kind, _, mac, _| *kind == AuthRequestKind::Logout && mac.to_string() == "AA:BB")
            .times(1)
            .return_const(());
        let ctx = context(transport, auth);
        insert_authed(&ctx, "AA:BB", true).await;

        // Act
        let outcome = run_cycle(&ctx, &config(), 0, &AtomicU64::new(0)).await.unwrap();

        // Assert: the deny found nothing left to revoke
        assert_eq!(outcome, HandleOutcome::Applied { denied: 0 });
        assert!(ctx.registry.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_eviction_happens_even_when_transport_fails() {
        // Arrange
        let mut transport = MockReportTransport::new();
        transport.expect_post().times(1).returning(|_, _| None);
        let mut auth = MockAuthClient::new();
        auth.expect_request().times(1).return_const(());
        let ctx = context(transport, auth);
        insert_authed(&ctx, "AA:BB", true).await;

        // Act
        let outcome = run_cycle(&ctx, &config(), 0, &AtomicU64::new(0)).await.unwrap();

        // Assert
        assert_eq!(outcome, HandleOutcome::NoBody);
        assert!(ctx.registry.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_stale_generation_skips_collection_and_send() {
        let mut transport = MockReportTransport::new();
        transport.expect_post().times(0);
        let mut auth = MockAuthClient::new();
        auth.expect_request().times(0);
        let ctx = context(transport, auth);
        insert_authed(&ctx, "AA:BB", true).await;

        let outcome = run_cycle(&ctx, &config(), 0, &AtomicU64::new(1)).await.unwrap();

        assert_eq!(outcome, HandleOutcome::Stale);
        assert_eq!(ctx.registry.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_reply_after_stop_is_discarded() {
        // Arrange: the transport "stops" the reporter while the POST is in flight
        let current = Arc::new(AtomicU64::new(0));
        let bump = Arc::clone(&current);
        let mut transport = MockReportTransport::new();
        transport.expect_post().times(1).returning(move |_, _| {
            bump.fetch_add(1, Ordering::SeqCst);
            Some(r#"{"resp":[{"mac":"AA:BB","auth":0}]}"#.to_string())
        });
        let mut auth = MockAuthClient::new();
        auth.expect_request().times(0);
        let ctx = context(transport, auth);
        insert_authed(&ctx, "AA:BB", false).await;

        // Act
        let outcome = run_cycle(&ctx, &config(), 0, &current).await.unwrap();

        // Assert: the deny was not applied
        assert_eq!(outcome, HandleOutcome::Stale);
        assert!(ctx.registry.lock().await.find("AA:BB").is_some());
    }
}
