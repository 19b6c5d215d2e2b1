//! Portal gateway counters reporter: entry point.
//!
//! Every `check_interval_secs` this process reports the traffic counters of
//! all authenticated terminals to the auth server, evicts terminals whose
//! idle timeout expired and revokes the ones the auth server denies.
//!
//! # Usage
//!
//! ```text
//! portal-counters [OPTIONS]
//!
//! Options:
//!   --config         <PATH>  TOML config file [default: /etc/portal/counters.toml]
//!   --check-interval <SECS>  Override check_interval_secs from the file
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                | Description                             |
//! |-------------------------|-----------------------------------------|
//! | `PORTAL_CONFIG`         | Config file path                        |
//! | `PORTAL_CHECK_INTERVAL` | Report interval in seconds              |
//! | `RUST_LOG`              | Log filter; overrides `log_level`       |
//!
//! # Signals
//!
//! - `SIGHUP` re-reads the config file; the new values apply from the next
//!   cycle.  An invalid file is logged and the running config is kept.
//! - `Ctrl+C` stops the scheduler and exits.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use portal_counters::application::{
    shared_registry, ConfigSource, CountersContext, CountersScheduler,
};
use portal_counters::domain::CountersConfig;
use portal_counters::infrastructure::storage::load_config;
use portal_counters::infrastructure::{HttpAuthClient, HttpTransport, SharedConfig, SystemClock};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Periodic terminal counters reporter for the portal gateway.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "portal-counters",
    about = "Reports terminal traffic counters to the portal auth server",
    version
)]
struct Cli {
    /// Path to the TOML configuration file.
    ///
    /// A missing file is not an error: built-in defaults are used.
    #[arg(long, default_value = "/etc/portal/counters.toml", env = "PORTAL_CONFIG")]
    config: PathBuf,

    /// Seconds between two reports.  Takes precedence over the file.
    #[arg(long, env = "PORTAL_CHECK_INTERVAL")]
    check_interval: Option<u64>,
}

impl Cli {
    /// Loads the config file and applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid.
    fn resolve_config(&self) -> anyhow::Result<CountersConfig> {
        let mut config = load_config(&self.config)
            .with_context(|| format!("failed to load config from {}", self.config.display()))?;
        if let Some(secs) = self.check_interval {
            config.check_interval_secs = secs;
        }
        config.validate().context("invalid --check-interval")?;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    if !cli.config.exists() {
        warn!("config file {} not found; using defaults", cli.config.display());
    }
    info!(
        "portal counters reporter starting: auth_url={}, interval={}s",
        config.auth_url, config.check_interval_secs
    );

    let shared = SharedConfig::new(config)?;
    let source: Arc<dyn ConfigSource> = Arc::new(shared.clone());

    let ctx = CountersContext {
        registry: shared_registry(),
        transport: Arc::new(HttpTransport::new(Arc::clone(&source))?),
        auth: Arc::new(HttpAuthClient::new(Arc::clone(&source))?),
        clock: Arc::new(SystemClock),
    };
    let scheduler = CountersScheduler::new(ctx, source);
    scheduler.start();

    #[cfg(unix)]
    tokio::spawn(reload_on_sighup(cli.clone(), shared));

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl+C")?;
    info!("received Ctrl+C; stopping");
    scheduler.stop();

    info!("portal counters reporter stopped");
    Ok(())
}

/// Re-reads the config file on every `SIGHUP`.
#[cfg(unix)]
async fn reload_on_sighup(cli: Cli, shared: SharedConfig) {
    use tokio::signal::unix::{signal, SignalKind};
    use tracing::error;

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(e) => {
            error!("failed to install SIGHUP handler: {e}");
            return;
        }
    };

    while hangup.recv().await.is_some() {
        let reloaded = cli
            .resolve_config()
            .and_then(|cfg| shared.replace(cfg).map_err(anyhow::Error::from));
        match reloaded {
            Ok(()) => info!("configuration reloaded from {}", cli.config.display()),
            Err(e) => error!("configuration reload failed, keeping previous: {e:#}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
