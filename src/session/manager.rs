use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{Session, SharedSession};
use crate::error::{AuthError, AuthResult, GatewayError};
use crate::gateway::{Ack, Envelope, Gateway};
use crate::models::{RegisterRequest, UserProfile, UserUpdate};
use crate::navigation::{Navigator, ENTRY_ROUTE};
use crate::storage::SessionStore;

/// Result of confirming a restored session with the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// The backend confirmed the token and returned the current profile.
    Confirmed,
    /// The backend rejected the token; the session was cleared.
    Cleared,
    /// No token was present, nothing to confirm.
    Anonymous,
}

/// Owns every transition of the session state.
///
/// The token and user are only ever written here (and by the invalidation
/// hook on a 401), and the persisted mirror always follows the in-memory
/// state.
pub struct SessionManager {
    gateway: Gateway,
    store: Arc<dyn SessionStore>,
    session: SharedSession,
    navigator: Navigator,
}

impl SessionManager {
    pub fn new(
        gateway: Gateway,
        store: Arc<dyn SessionStore>,
        session: SharedSession,
        navigator: Navigator,
    ) -> Self {
        Self {
            gateway,
            store,
            session,
            navigator,
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Copy of the current session
    pub async fn snapshot(&self) -> Session {
        self.session.snapshot().await
    }

    /// Load the persisted token and user mirror into memory.
    ///
    /// A user mirror without a token is stale and gets removed.
    pub async fn restore(&self) -> AuthResult<Session> {
        let token = self.store.load_token().await?;
        let mut user = self.store.load_user().await?;

        if token.is_none() && user.is_some() {
            debug!("Dropping user mirror without a token");
            self.store.remove_user().await?;
            user = None;
        }

        self.session.install(token, user).await;
        Ok(self.session.snapshot().await)
    }

    /// Confirm the current token with the identity probe.
    ///
    /// - success: the returned profile replaces the user and is persisted
    /// - failure envelope or 401: the session is cleared
    /// - any other failure: the persisted user mirror, if there is one, is
    ///   kept in memory and the error is returned; without a mirror the
    ///   session is cleared first
    pub async fn hydrate(&self) -> AuthResult<HydrateOutcome> {
        if self.session.token().await.is_none() {
            if self.session.user().await.is_some() {
                self.clear_local().await?;
            }
            return Ok(HydrateOutcome::Anonymous);
        }

        // Read before the probe; a concurrent 401 elsewhere may clear it.
        let mirror = self.store.load_user().await?;

        match self.gateway.me().await {
            Ok(Envelope {
                success: true,
                data: Some(user),
                ..
            }) => {
                // The session may have been invalidated while /auth/me was in flight.
                if self.session.token().await.is_none() {
                    info!(username = %user.username, "Session cleared while confirming identity, discarding profile");
                    return Ok(HydrateOutcome::Cleared);
                }
                self.store.save_user(&user).await?;
                debug!(username = %user.username, "Session confirmed");
                self.session.set_user(Some(user)).await;
                Ok(HydrateOutcome::Confirmed)
            }
            Ok(envelope) => {
                info!(reason = %envelope.failure_message(), "Identity probe rejected session");
                self.clear_local().await?;
                Ok(HydrateOutcome::Cleared)
            }
            Err(GatewayError::Unauthorized { .. }) => {
                info!("Identity probe returned 401, clearing session");
                self.clear_local().await?;
                Ok(HydrateOutcome::Cleared)
            }
            Err(e) => {
                match mirror {
                    Some(user) => {
                        warn!(error = %e, username = %user.username, "Identity probe failed, continuing with cached profile");
                        self.session.set_user(Some(user)).await;
                    }
                    None => {
                        warn!(error = %e, "Identity probe failed without cached profile, clearing session");
                        self.clear_local().await?;
                    }
                }
                Err(AuthError::Gateway(e))
            }
        }
    }

    /// Exchange credentials for a session.
    ///
    /// On success the token and user are installed together and persisted.
    /// On failure the session is left untouched.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<UserProfile> {
        let envelope = match self.gateway.login(username, password).await {
            Ok(envelope) => envelope,
            Err(GatewayError::Unauthorized { message }) => {
                return Err(AuthError::Rejected { message })
            }
            Err(e) => return Err(e.into()),
        };

        if !envelope.success {
            return Err(AuthError::Rejected {
                message: envelope.failure_message(),
            });
        }
        let login = envelope.data.ok_or_else(|| AuthError::Rejected {
            message: "login response without credentials".to_string(),
        })?;

        self.store.save_token(&login.access_token).await?;
        self.store.save_user(&login.user).await?;
        self.session
            .install(Some(login.access_token), Some(login.user.clone()))
            .await;

        info!(username = %login.user.username, role = %login.user.role, "Logged in");
        Ok(login.user)
    }

    /// End the session and send the user to the entry route.
    ///
    /// Purely local; the in-memory session is cleared even if the store
    /// fails.
    pub async fn logout(&self) -> AuthResult<()> {
        self.session.clear().await;
        self.navigator.redirect_to(ENTRY_ROUTE);
        info!("Logged out");
        self.store.clear().await?;
        Ok(())
    }

    /// Change the current user's password; the session is not affected.
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> AuthResult<()> {
        let envelope = self
            .gateway
            .change_password(old_password, new_password)
            .await?;
        if envelope.success {
            Ok(())
        } else {
            Err(AuthError::Rejected {
                message: envelope.failure_message(),
            })
        }
    }

    /// Replace the in-memory user and its persisted mirror
    pub async fn update_user(&self, user: UserProfile) -> AuthResult<()> {
        self.store.save_user(&user).await?;
        self.session.set_user(Some(user)).await;
        Ok(())
    }

    // ==================== Account administration ====================

    pub async fn register_user(&self, request: &RegisterRequest) -> AuthResult<Ack> {
        Ok(self.gateway.register(request).await?)
    }

    pub async fn list_users(&self) -> AuthResult<Vec<UserProfile>> {
        Ok(self.gateway.list_users().await?)
    }

    pub async fn update_account(&self, username: &str, update: &UserUpdate) -> AuthResult<Ack> {
        Ok(self.gateway.update_user(username, update).await?)
    }

    pub async fn delete_account(&self, username: &str) -> AuthResult<Ack> {
        Ok(self.gateway.delete_user(username).await?)
    }

    async fn clear_local(&self) -> AuthResult<()> {
        self.session.clear().await;
        self.store.clear().await?;
        Ok(())
    }
}
