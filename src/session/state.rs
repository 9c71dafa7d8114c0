use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::UserProfile;

/// The authenticated identity held by the client.
///
/// A token without a user only exists transiently, between restore and
/// hydration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    /// Both a token and a user are present.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(UserProfile::is_admin)
    }

    pub fn is_reviewer(&self) -> bool {
        self.user.as_ref().is_some_and(UserProfile::is_reviewer)
    }
}

/// Shared handle to the process-wide session.
///
/// Cloning the handle shares the same session. Reads are open to everyone;
/// writes are restricted to the session module.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    inner: Arc<RwLock<Session>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current session
    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    /// Current token, if any
    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.token.clone()
    }

    /// Current user, if any
    pub async fn user(&self) -> Option<UserProfile> {
        self.inner.read().await.user.clone()
    }

    /// Replace token and user together
    pub(crate) async fn install(&self, token: Option<String>, user: Option<UserProfile>) {
        let mut session = self.inner.write().await;
        session.token = token;
        session.user = user;
    }

    pub(crate) async fn set_user(&self, user: Option<UserProfile>) {
        self.inner.write().await.user = user;
    }

    pub(crate) async fn clear(&self) {
        *self.inner.write().await = Session::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_authenticated_requires_both_fields() {
        let mut session = Session::default();
        assert!(!session.is_authenticated());

        session.token = Some("tok".to_string());
        assert!(session.has_token());
        assert!(!session.is_authenticated());

        session.user = Some(UserProfile::new("u", "alice", Role::Reviewer));
        assert!(session.is_authenticated());
        assert!(session.is_reviewer());
        assert!(!session.is_admin());

        session.token = None;
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_shared_handles_see_same_state() {
        let a = SharedSession::new();
        let b = a.clone();

        a.install(
            Some("tok".to_string()),
            Some(UserProfile::new("u", "root", Role::Admin)),
        )
        .await;
        assert!(b.snapshot().await.is_admin());

        b.clear().await;
        assert!(a.token().await.is_none());
        assert!(a.user().await.is_none());
    }
}
