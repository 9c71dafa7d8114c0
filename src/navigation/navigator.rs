use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// The unauthenticated entry route.
pub const ENTRY_ROUTE: &str = "/login";
/// Where authenticated users land when no other route applies.
pub const DEFAULT_ROUTE: &str = "/tasks";

#[derive(Debug)]
struct Location {
    current: String,
    pending_redirect: Option<String>,
}

/// Tracks the current route and at most one pending redirect.
///
/// Redirects are side effects requested by the session layer (logout,
/// invalidated session); the embedding surface takes and performs them.
#[derive(Debug, Clone)]
pub struct Navigator {
    location: Arc<Mutex<Location>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    /// Start at the root route with no pending redirect
    pub fn new() -> Self {
        Self::starting_at("/")
    }

    /// Start at `path`
    pub fn starting_at(path: impl Into<String>) -> Self {
        Self {
            location: Arc::new(Mutex::new(Location {
                current: path.into(),
                pending_redirect: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Location> {
        self.location.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> String {
        self.lock().current.clone()
    }

    pub fn set_current(&self, path: impl Into<String>) {
        self.lock().current = path.into();
    }

    /// Whether the current route is the entry (login) route
    pub fn is_on_entry_route(&self) -> bool {
        let location = self.lock();
        match location.current.strip_prefix(ENTRY_ROUTE) {
            Some(rest) => rest.is_empty() || rest.starts_with(['?', '#']),
            None => false,
        }
    }

    /// Request a redirect; a later request replaces an earlier one.
    pub fn redirect_to(&self, path: impl Into<String>) {
        let path = path.into();
        debug!(to = %path, "Redirect requested");
        self.lock().pending_redirect = Some(path);
    }

    pub fn pending_redirect(&self) -> Option<String> {
        self.lock().pending_redirect.clone()
    }

    /// Take the pending redirect, moving the current route to it
    pub fn take_redirect(&self) -> Option<String> {
        let mut location = self.lock();
        let target = location.pending_redirect.take()?;
        location.current = target.clone();
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_lifecycle() {
        let nav = Navigator::starting_at("/tasks");
        assert!(nav.pending_redirect().is_none());
        assert!(!nav.is_on_entry_route());

        nav.redirect_to(ENTRY_ROUTE);
        assert_eq!(nav.pending_redirect().as_deref(), Some(ENTRY_ROUTE));
        assert_eq!(nav.current(), "/tasks");

        assert_eq!(nav.take_redirect().as_deref(), Some(ENTRY_ROUTE));
        assert!(nav.is_on_entry_route());
        assert!(nav.take_redirect().is_none());
    }

    #[test]
    fn test_entry_route_matches_whole_path() {
        assert!(Navigator::starting_at("/login").is_on_entry_route());
        assert!(Navigator::starting_at("/login?redirect=/tasks").is_on_entry_route());
        assert!(!Navigator::starting_at("/login-help").is_on_entry_route());
        assert!(!Navigator::starting_at("/loginx").is_on_entry_route());
        assert!(!Navigator::starting_at("/").is_on_entry_route());
    }

    #[test]
    fn test_clones_share_location() {
        let nav = Navigator::new();
        let other = nav.clone();
        other.set_current("/review/t1");
        assert_eq!(nav.current(), "/review/t1");
    }
}
