//! Session lifecycle.
//!
//! This module provides:
//! - The shared [`Session`] (token + user) and its handle
//! - [`SessionManager`] for restore, hydration, login and logout
//! - The [`SessionInvalidation`] hook that reacts to 401/403 responses
//! - [`SessionContext`], which wires all of the above to one gateway

mod invalidation;
mod manager;
mod state;

pub use invalidation::SessionInvalidation;
pub use manager::{HydrateOutcome, SessionManager};
pub use state::{Session, SharedSession};

use std::sync::Arc;

use crate::config::{ApiConfig, RequestConfig};
use crate::error::GatewayResult;
use crate::gateway::{BearerAuth, Gateway};
use crate::navigation::Navigator;
use crate::notify::Notifier;
use crate::storage::SessionStore;

/// Everything that shares one session: the gateway with its interceptors,
/// the navigator and the session manager.
#[derive(Clone)]
pub struct SessionContext {
    pub session: SharedSession,
    pub navigator: Navigator,
    pub notifier: Arc<dyn Notifier>,
    pub gateway: Gateway,
    pub manager: Arc<SessionManager>,
}

impl SessionContext {
    pub fn new(
        api: &ApiConfig,
        request: RequestConfig,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> GatewayResult<Self> {
        let session = SharedSession::new();
        let navigator = Navigator::new();

        let gateway = Gateway::new(api, request)?
            .with_interceptor(Arc::new(BearerAuth::new(session.clone())))
            .with_interceptor(Arc::new(SessionInvalidation::new(
                session.clone(),
                store.clone(),
                navigator.clone(),
                notifier.clone(),
            )));

        let manager = Arc::new(SessionManager::new(
            gateway.clone(),
            store,
            session.clone(),
            navigator.clone(),
        ));

        Ok(Self {
            session,
            navigator,
            notifier,
            gateway,
            manager,
        })
    }
}
