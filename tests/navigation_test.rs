//! Integration tests for the navigation guard
//!
//! Every decision is evaluated against a real `SessionManager`; the identity
//! probe is served by wiremock.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use kgegen_console::config::{ApiConfig, RequestConfig};
use kgegen_console::models::{Role, UserProfile};
use kgegen_console::navigation::{
    GuardDecision, NavigationGuard, Route, RouteMeta, RouteTable, DEFAULT_ROUTE, ENTRY_ROUTE,
};
use kgegen_console::notify::RecordingNotifier;
use kgegen_console::session::SessionContext;
use kgegen_console::storage::{MemorySessionStore, SessionStore};

#[derive(Debug, Clone, Copy)]
enum SessionState {
    NoSession,
    TokenWithoutUser,
    Reviewer,
    Admin,
}

fn matrix_routes() -> RouteTable {
    RouteTable::new(vec![
        Route::new(ENTRY_ROUTE, RouteMeta::public("Login")),
        Route::new("/open", RouteMeta::public("Open")),
        Route::new(
            "/open-admin",
            RouteMeta {
                title: Some("Open Admin"),
                requires_auth: false,
                requires_admin: true,
            },
        ),
        Route::new("/private", RouteMeta::authenticated("Private")),
        Route::new("/admin", RouteMeta::admin("Admin")),
    ])
}

async fn probe_server(role: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"user_id": "u-1", "username": "alice", "role": role}
        })))
        .mount(&server)
        .await;
    server
}

fn context(base_url: &str, store: Arc<MemorySessionStore>, timeout_ms: u64) -> SessionContext {
    let api = ApiConfig {
        base_url: base_url.to_string(),
    };
    SessionContext::new(
        &api,
        RequestConfig { timeout_ms },
        store,
        Arc::new(RecordingNotifier::new()),
    )
    .expect("Failed to build session context")
}

async fn guard_in(state: SessionState, base_url: &str, routes: RouteTable) -> (NavigationGuard, SessionContext) {
    let store = match state {
        SessionState::NoSession => MemorySessionStore::new(),
        SessionState::TokenWithoutUser => MemorySessionStore::with_entries(Some("tok"), None),
        SessionState::Reviewer => MemorySessionStore::with_entries(
            Some("tok"),
            Some(&UserProfile::new("u-1", "alice", Role::Reviewer)),
        ),
        SessionState::Admin => MemorySessionStore::with_entries(
            Some("tok"),
            Some(&UserProfile::new("u-0", "root", Role::Admin)),
        ),
    };
    let ctx = context(base_url, Arc::new(store), 2000);
    ctx.manager.restore().await.unwrap();
    (NavigationGuard::new(ctx.manager.clone(), routes), ctx)
}

fn allow() -> GuardDecision {
    GuardDecision::Allow
}

fn redirect(to: &str) -> GuardDecision {
    GuardDecision::Redirect(to.to_string())
}

#[cfg(test)]
mod matrix_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Every {requires_auth, requires_admin} × session state combination
    /// resolves to a decision.
    #[tokio::test]
    async fn test_guard_resolves_every_combination() {
        let server = probe_server("reviewer").await;

        let cases = [
            (SessionState::NoSession, "/open", allow()),
            (SessionState::NoSession, "/open-admin", allow()),
            (SessionState::NoSession, "/private", redirect(ENTRY_ROUTE)),
            (SessionState::NoSession, "/admin", redirect(ENTRY_ROUTE)),
            (SessionState::TokenWithoutUser, "/open", allow()),
            (SessionState::TokenWithoutUser, "/open-admin", allow()),
            (SessionState::TokenWithoutUser, "/private", allow()),
            (SessionState::TokenWithoutUser, "/admin", redirect(DEFAULT_ROUTE)),
            (SessionState::Reviewer, "/open", allow()),
            (SessionState::Reviewer, "/open-admin", allow()),
            (SessionState::Reviewer, "/private", allow()),
            (SessionState::Reviewer, "/admin", redirect(DEFAULT_ROUTE)),
            (SessionState::Admin, "/open", allow()),
            (SessionState::Admin, "/open-admin", allow()),
            (SessionState::Admin, "/private", allow()),
            (SessionState::Admin, "/admin", allow()),
        ];

        for (state, target, expected) in cases {
            let (guard, _ctx) = guard_in(state, &server.uri(), matrix_routes()).await;
            let decision = tokio::time::timeout(Duration::from_secs(5), guard.evaluate(target))
                .await
                .unwrap_or_else(|_| panic!("guard hung for {:?} -> {}", state, target));
            assert_eq!(decision, expected, "{:?} -> {}", state, target);
        }
    }

    #[tokio::test]
    async fn test_token_without_user_hydrates_before_deciding() {
        let server = probe_server("admin").await;
        let (guard, ctx) = guard_in(SessionState::TokenWithoutUser, &server.uri(), matrix_routes()).await;

        assert_eq!(guard.evaluate("/admin").await, allow());
        assert!(ctx.manager.snapshot().await.is_admin());
    }
}

#[cfg(test)]
mod console_route_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_entry_route_sends_authenticated_users_home() {
        let (guard, _ctx) =
            guard_in(SessionState::Reviewer, "http://localhost:1", RouteTable::console()).await;
        assert_eq!(guard.evaluate("/login").await, redirect(DEFAULT_ROUTE));

        let (guard, _ctx) =
            guard_in(SessionState::NoSession, "http://localhost:1", RouteTable::console()).await;
        assert_eq!(guard.evaluate("/login").await, allow());
    }

    #[tokio::test]
    async fn test_admin_routes_redirect_reviewers() {
        let (guard, _ctx) =
            guard_in(SessionState::Reviewer, "http://localhost:1", RouteTable::console()).await;
        for target in ["/create", "/config", "/users"] {
            assert_eq!(guard.evaluate(target).await, redirect(DEFAULT_ROUTE), "{}", target);
        }
        assert_eq!(guard.evaluate("/review/t-1/detail/i-9").await, allow());
    }

    #[tokio::test]
    async fn test_unknown_paths_fail_closed() {
        let (guard, _ctx) =
            guard_in(SessionState::NoSession, "http://localhost:1", RouteTable::console()).await;
        assert_eq!(guard.evaluate("/nowhere").await, redirect(ENTRY_ROUTE));

        let (guard, _ctx) =
            guard_in(SessionState::Reviewer, "http://localhost:1", RouteTable::console()).await;
        assert_eq!(guard.evaluate("/nowhere").await, allow());
    }

    #[tokio::test]
    async fn test_navigate_follows_redirects_and_moves_navigator() {
        let (guard, ctx) =
            guard_in(SessionState::NoSession, "http://localhost:1", RouteTable::console()).await;
        assert_eq!(guard.navigate("/").await, ENTRY_ROUTE);
        assert_eq!(ctx.navigator.current(), ENTRY_ROUTE);

        let (guard, ctx) =
            guard_in(SessionState::Admin, "http://localhost:1", RouteTable::console()).await;
        assert_eq!(guard.navigate("/").await, DEFAULT_ROUTE);
        assert_eq!(guard.navigate("/login").await, DEFAULT_ROUTE);
        assert_eq!(guard.navigate("/users").await, "/users");
        assert_eq!(ctx.navigator.current(), "/users");
    }
}

#[cfg(test)]
mod degraded_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn slow_probe_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "data": null}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_unreachable_backend_with_cached_user_proceeds() {
        let server = slow_probe_server().await;
        let store = Arc::new(MemorySessionStore::with_entries(Some("tok"), None));
        let ctx = context(&server.uri(), store.clone(), 100);
        ctx.manager.restore().await.unwrap();
        // Mirror written after restore: in memory there is a token but no user.
        store
            .save_user(&UserProfile::new("u-1", "alice", Role::Reviewer))
            .await
            .unwrap();

        let guard = NavigationGuard::new(ctx.manager.clone(), RouteTable::console());
        assert_eq!(guard.evaluate("/tasks").await, allow());
        assert_eq!(
            ctx.manager.snapshot().await.user.map(|u| u.username),
            Some("alice".to_string())
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_without_cached_user_redirects() {
        let server = slow_probe_server().await;
        let store = Arc::new(MemorySessionStore::with_entries(Some("tok"), None));
        let ctx = context(&server.uri(), store, 100);
        ctx.manager.restore().await.unwrap();

        let guard = NavigationGuard::new(ctx.manager.clone(), RouteTable::console());
        assert_eq!(guard.evaluate("/tasks").await, redirect(ENTRY_ROUTE));
    }
}
