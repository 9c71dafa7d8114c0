use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::SharedSession;
use crate::error::{GatewayError, TransportKind};
use crate::gateway::{CallContext, Interceptor};
use crate::navigation::{Navigator, ENTRY_ROUTE};
use crate::notify::{Notification, NotificationLevel, Notifier};
use crate::storage::SessionStore;

/// Gateway error hook enforcing the global session rules.
///
/// - 401 anywhere but the entry route (or the login call itself) clears the
///   session and redirects to the entry route
/// - 403 is reported but keeps the session
/// - every other failure produces one user notification
///
/// The identity probe is exempt: hydration interprets its failures.
pub struct SessionInvalidation {
    session: SharedSession,
    store: Arc<dyn SessionStore>,
    navigator: Navigator,
    notifier: Arc<dyn Notifier>,
}

impl SessionInvalidation {
    pub fn new(
        session: SharedSession,
        store: Arc<dyn SessionStore>,
        navigator: Navigator,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            store,
            navigator,
            notifier,
        }
    }

    fn error(&self, message: impl Into<String>) {
        self.notifier
            .notify(Notification::new(NotificationLevel::Error, message));
    }

    async fn invalidate(&self, ctx: &CallContext) {
        if self.navigator.is_on_entry_route() {
            return;
        }

        info!(path = %ctx.path, "Session rejected by backend, clearing");
        self.session.clear().await;
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear persisted session");
        }
        self.error("Session expired, please log in again");
        self.navigator.redirect_to(ENTRY_ROUTE);
    }
}

#[async_trait]
impl Interceptor for SessionInvalidation {
    async fn on_error(&self, ctx: &CallContext, error: &GatewayError) {
        if ctx.is_identity_probe() {
            return;
        }

        match error {
            GatewayError::Unauthorized { .. } if ctx.is_login() => {}
            GatewayError::Unauthorized { .. } => self.invalidate(ctx).await,
            GatewayError::Forbidden { .. } => self.error("Insufficient permissions"),
            GatewayError::NotFoundIgnorable { .. } => {}
            GatewayError::Transport { kind, message } => match kind {
                TransportKind::Timeout => self.error("Request timed out, please retry later"),
                TransportKind::Connection => {
                    self.error("Network error, check that the backend service is running")
                }
                TransportKind::Interrupted => {
                    self.error("Connection interrupted, check the network and retry")
                }
                TransportKind::Other => self.error(format!("Request failed: {}", message)),
            },
            GatewayError::Http { message, .. } => self.error(message.clone()),
            other => self.error(other.to_string()),
        }
    }
}
