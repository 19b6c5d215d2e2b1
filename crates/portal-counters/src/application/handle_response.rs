//! HandleResponse: applies the auth server's verdicts to the registry.
//!
//! Called exactly once per transport completion.  Every failure mode ends
//! here: nothing is propagated to the scheduler.
//!
//! | Input                                  | Effect                                   |
//! |----------------------------------------|------------------------------------------|
//! | no body (transport failure)            | warn, no mutation                        |
//! | body that is not a `{"resp":[...]}`    | error, whole batch discarded             |
//! | verdict without `mac`                  | skipped                                  |
//! | `mac` not in the registry              | skipped (unknown subjects are not errors)|
//! | `auth == 0`                            | logout notification, then removal        |
//! | any other `auth`, or no `auth`         | no-op                                    |

use portal_core::{decode_response, TerminalRegistry};
use tracing::{debug, error, info, warn};

use super::collaborators::{AuthClient, AuthRequestKind};

/// What happened to one auth server reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The transport delivered no body.
    NoBody,
    /// The body could not be decoded; nothing was applied.
    Malformed,
    /// The reply belonged to a reporter that has since been stopped and was
    /// discarded without touching the registry.
    Stale,
    /// The reply was applied; `denied` terminals were revoked.
    Applied { denied: usize },
}

/// Decodes `body` and revokes every terminal the auth server denied.
///
/// The whole document is decoded before the registry is touched, so a
/// malformed reply never leaves a partially applied batch behind.
pub fn handle_response(
    body: Option<&str>,
    registry: &mut TerminalRegistry,
    auth: &dyn AuthClient,
) -> HandleOutcome {
    let Some(body) = body else {
        warn!("counters: no response from auth server");
        return HandleOutcome::NoBody;
    };

    let response = match decode_response(body) {
        Ok(response) => response,
        Err(e) => {
            error!("counters: invalid response format: {e}");
            return HandleOutcome::Malformed;
        }
    };

    let mut denied = 0;
    for verdict in &response.resp {
        let Some(mac) = verdict.denied_mac() else {
            continue;
        };
        let Some(term) = registry.find(mac) else {
            debug!("counters: auth server denied unknown terminal {mac}; ignoring");
            continue;
        };

        info!("counters: auth server denied {mac}");
        auth.request(AuthRequestKind::Logout, &term.ip, &term.mac, &term.token);
        registry.remove(mac);
        denied += 1;
    }

    HandleOutcome::Applied { denied }
}
