//! Fire-and-forget logout notifications to the auth server.
//!
//! ```text
//! GET <auth_url>&stage=logout&ip=<ip>&mac=<mac>&token=<token>
//! ```
//!
//! [`HttpAuthClient::request`] returns at once; the GET runs on its own Tokio
//! task and its outcome is only logged.  The query string carries the
//! session token, so request URLs never appear in log output.

use std::sync::Arc;

use portal_core::stage_url;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::http_transport::TransportError;
use crate::application::{AuthClient, AuthRequestKind, ConfigSource};

/// [`AuthClient`] over `reqwest`.
#[derive(Clone)]
pub struct HttpAuthClient {
    http: Client,
    config: Arc<dyn ConfigSource>,
}

impl HttpAuthClient {
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: Arc<dyn ConfigSource>) -> Result<Self, TransportError> {
        let http = Client::builder().build()?;
        Ok(Self { http, config })
    }

    /// Builds the request URL for one notification, or `None` if the
    /// configured `auth_url` is not a valid URL.
    fn request_url(
        &self,
        kind: AuthRequestKind,
        ip: &str,
        mac: &str,
        token: &str,
    ) -> Option<Url> {
        let base = stage_url(&self.config.snapshot().auth_url, kind.stage());
        let mut url = match Url::parse(&base) {
            Ok(url) => url,
            Err(e) => {
                warn!("auth: invalid auth_url: {e}");
                return None;
            }
        };
        url.query_pairs_mut()
            .append_pair("ip", ip)
            .append_pair("mac", mac)
            .append_pair("token", token);
        Some(url)
    }

    /// Spawns the GET for one notification.  Returns `false` when nothing
    /// was sent.
    fn spawn_request(&self, kind: AuthRequestKind, ip: &str, mac: &str, token: &str) -> bool {
        let Some(url) = self.request_url(kind, ip, mac, token) else {
            warn!("auth: {} for {mac} not sent", kind.stage());
            return false;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("auth: no async runtime, {} for {mac} not sent", kind.stage());
            return false;
        };

        let http = self.http.clone();
        let timeout = self.config.snapshot().request_timeout();
        let stage = kind.stage();
        let mac = mac.to_string();
        handle.spawn(async move {
            match http.get(url).timeout(timeout).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("auth: {stage} for {mac} delivered");
                }
                Ok(response) => {
                    warn!(
                        "auth: {stage} for {mac} rejected with HTTP {}",
                        response.status().as_u16()
                    );
                }
                Err(e) => warn!("auth: {stage} for {mac} failed: {}", redacted(e)),
            }
        });
        true
    }
}

impl AuthClient for HttpAuthClient {
    fn request(&self, kind: AuthRequestKind, ip: &str, mac: &str, token: &str) {
        self.spawn_request(kind, ip, mac, token);
    }
}

/// Error text with the request URL, and so the token, stripped.
fn redacted(e: reqwest::Error) -> String {
    e.without_url().to_string()
}
