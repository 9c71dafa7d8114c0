use std::sync::Arc;
use tracing::{debug, error, warn};

use super::navigator::{DEFAULT_ROUTE, ENTRY_ROUTE};
use super::routes::{ResolvedRoute, RouteTable};
use crate::error::{AuthError, AuthResult};
use crate::session::SessionManager;

/// Upper bound on chained redirects followed by [`NavigationGuard::navigate`].
const MAX_REDIRECTS: usize = 5;

/// Decision for a single navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Access-control check evaluated before every route change.
pub struct NavigationGuard {
    manager: Arc<SessionManager>,
    routes: RouteTable,
}

impl NavigationGuard {
    pub fn new(manager: Arc<SessionManager>, routes: RouteTable) -> Self {
        Self { manager, routes }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decide whether navigation to `path` may proceed.
    ///
    /// Always resolves. A failure while checking falls back to the entry
    /// route for protected routes and allows the rest.
    pub async fn evaluate(&self, path: &str) -> GuardDecision {
        let route = self.routes.resolve(path);
        if let Some(target) = route.redirect {
            return GuardDecision::Redirect(target.to_string());
        }

        match self.check(&route).await {
            Ok(decision) => decision,
            Err(e) => {
                error!(path = %path, error = %e, "Navigation guard failed");
                if route.meta.requires_auth {
                    GuardDecision::Redirect(ENTRY_ROUTE.to_string())
                } else {
                    GuardDecision::Allow
                }
            }
        }
    }

    async fn check(&self, route: &ResolvedRoute) -> AuthResult<GuardDecision> {
        if route.meta.requires_auth {
            let session = self.manager.snapshot().await;
            if !session.has_token() {
                return Ok(GuardDecision::Redirect(ENTRY_ROUTE.to_string()));
            }

            if session.user.is_none() {
                match self.manager.hydrate().await {
                    Ok(_) => {}
                    // Storage failures are not a hydration outcome.
                    Err(e @ AuthError::Storage(_)) => return Err(e),
                    Err(e) => {
                        warn!(error = %e, "Hydration failed during navigation");
                    }
                }
                if self.manager.session().user().await.is_none() {
                    return Ok(GuardDecision::Redirect(ENTRY_ROUTE.to_string()));
                }
            }

            if route.meta.requires_admin && !self.manager.snapshot().await.is_admin() {
                return Ok(GuardDecision::Redirect(DEFAULT_ROUTE.to_string()));
            }
        }

        if route.is_entry() && self.manager.snapshot().await.is_authenticated() {
            return Ok(GuardDecision::Redirect(DEFAULT_ROUTE.to_string()));
        }

        Ok(GuardDecision::Allow)
    }

    /// Evaluate `path`, follow redirects and move the navigator there.
    ///
    /// Returns the route the user ends up on.
    pub async fn navigate(&self, path: &str) -> String {
        let mut target = path.to_string();
        for _ in 0..MAX_REDIRECTS {
            match self.evaluate(&target).await {
                GuardDecision::Allow => {
                    debug!(to = %target, "Navigation allowed");
                    self.manager.navigator().set_current(target.clone());
                    return target;
                }
                GuardDecision::Redirect(next) => {
                    debug!(from = %target, to = %next, "Navigation redirected");
                    target = next;
                }
            }
        }

        warn!(path = %path, "Redirect chain too long, falling back to entry route");
        self.manager.navigator().set_current(ENTRY_ROUTE);
        ENTRY_ROUTE.to_string()
    }
}
