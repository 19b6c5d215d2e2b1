//! HTTP transport for counters reports.
//!
//! Every failure (connect, timeout, non-2xx status, unreadable body) is
//! logged here and reported to the cycle as "no body", so the response
//! handler sees exactly one completion per request whatever happened.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::{ConfigSource, ReportTransport};

/// Errors raised while setting up the HTTP clients.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// [`ReportTransport`] over `reqwest`.
///
/// The request timeout is read from the live configuration on every POST,
/// so a reload applies to the next report.
pub struct HttpTransport {
    http: Client,
    config: Arc<dyn ConfigSource>,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: Arc<dyn ConfigSource>) -> Result<Self, TransportError> {
        let http = Client::builder().build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl ReportTransport for HttpTransport {
    async fn post(&self, url: &str, body: String) -> Option<String> {
        let timeout = self.config.snapshot().request_timeout();
        debug!("counters: POST {url} ({} bytes)", body.len());

        let response = match self
            .http
            .post(url)
            .timeout(timeout)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("counters: request to {url} failed: {e}");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("counters: auth server returned HTTP {}", status.as_u16());
            return None;
        }

        match response.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("counters: failed to read auth server response: {e}");
                None
            }
        }
    }
}
