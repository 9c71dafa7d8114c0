//! Integration tests for the console API gateway
//!
//! Uses wiremock to verify request decoration and error classification.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::{
    matchers::{header, header_exists, method, path},
    Mock, MockServer, ResponseTemplate,
};

use kgegen_console::config::{ApiConfig, RequestConfig};
use kgegen_console::error::{GatewayError, TransportKind};
use kgegen_console::gateway::{CallContext, Gateway, Interceptor, REQUEST_ID_HEADER};
use kgegen_console::models::{DownloadFormat, Role, UserProfile};
use kgegen_console::notify::{NotificationLevel, RecordingNotifier};
use kgegen_console::session::SessionContext;
use kgegen_console::storage::MemorySessionStore;
use kgegen_console::tasks::TaskStore;

/// Interceptor that records the path of every failed call
#[derive(Default)]
struct FailureLog {
    paths: Mutex<Vec<String>>,
}

#[async_trait]
impl Interceptor for FailureLog {
    async fn on_error(&self, ctx: &CallContext, _error: &GatewayError) {
        self.paths
            .lock()
            .expect("failure log poisoned")
            .push(ctx.path.clone());
    }
}

fn create_test_gateway(base_url: &str) -> Gateway {
    let api = ApiConfig {
        base_url: base_url.to_string(),
    };
    Gateway::new(&api, RequestConfig { timeout_ms: 2000 }).expect("Failed to create gateway")
}

/// Gateway wired with the session interceptors, as the console builds it
fn create_test_context(
    base_url: &str,
    store: MemorySessionStore,
) -> (SessionContext, Arc<RecordingNotifier>) {
    let api = ApiConfig {
        base_url: base_url.to_string(),
    };
    let notifier = Arc::new(RecordingNotifier::new());
    let ctx = SessionContext::new(
        &api,
        RequestConfig { timeout_ms: 2000 },
        Arc::new(store),
        notifier.clone(),
    )
    .expect("Failed to build session context");
    (ctx, notifier)
}

/// Serve every connection a 200 that promises a longer body than it sends
async fn truncated_body_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 500\r\n\r\n{\"success\": true, \"d",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}", addr)
}

fn signed_in_store() -> MemorySessionStore {
    MemorySessionStore::with_entries(
        Some("tok"),
        Some(&UserProfile::new("u-1", "alice", Role::Reviewer)),
    )
}

#[cfg(test)]
mod decoration_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_bearer_token_and_request_id_are_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .and(header("authorization", "Bearer tok-9"))
            .and(header_exists(REQUEST_ID_HEADER))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = MemorySessionStore::with_entries(
            Some("tok-9"),
            Some(&UserProfile::new("u-1", "alice", Role::Admin)),
        );
        let (ctx, _) = create_test_context(&server.uri(), store);
        ctx.manager.restore().await.unwrap();
        let gateway = ctx.gateway.clone();

        let tasks = gateway.list_tasks().await.unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_calls_carry_no_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
            .mount(&server)
            .await;

        let (ctx, _) = create_test_context(&server.uri(), MemorySessionStore::new());
        ctx.manager.restore().await.unwrap();
        let health = ctx.gateway.health_check().await.unwrap();
        assert_eq!(health["status"], "healthy");

        let requests = server.received_requests().await.unwrap_or_default();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }
}

#[cfg(test)]
mod classification_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn respond(server: &MockServer, verb: &str, route: &str, template: ResponseTemplate) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_status_codes_map_to_error_kinds() {
        let server = MockServer::start().await;
        respond(
            &server,
            "GET",
            "/tasks",
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})),
        )
        .await;
        respond(
            &server,
            "GET",
            "/auth/users",
            ResponseTemplate::new(403).set_body_json(json!({"detail": "Admin only"})),
        )
        .await;
        respond(&server, "GET", "/tasks/t-1", ResponseTemplate::new(500).set_body_string("boom")).await;

        let gateway = create_test_gateway(&server.uri());

        let err = gateway.list_tasks().await.unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized { ref message } if message == "Token expired"));

        let err = gateway.list_users().await.unwrap_err();
        assert!(err.is_forbidden());

        let err = gateway.get_task("t-1").await.unwrap_err();
        assert!(matches!(err, GatewayError::Http { status: 500, ref message } if message == "boom"));
    }

    #[tokio::test]
    async fn test_not_found_is_ignorable_only_under_auth() {
        let server = MockServer::start().await;
        respond(&server, "DELETE", "/auth/users/ghost", ResponseTemplate::new(404)).await;
        respond(&server, "GET", "/tasks/ghost", ResponseTemplate::new(404)).await;

        let gateway = create_test_gateway(&server.uri());

        let err = gateway.delete_user("ghost").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFoundIgnorable { ref path } if path == "/auth/users/ghost"));

        let err = gateway.get_task("ghost").await.unwrap_err();
        assert!(matches!(err, GatewayError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_failure_envelope_is_application_error() {
        let server = MockServer::start().await;
        respond(
            &server,
            "DELETE",
            "/tasks/t-1",
            ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "Task is running"
            })),
        )
        .await;

        let log = Arc::new(FailureLog::default());
        let gateway = create_test_gateway(&server.uri()).with_interceptor(log.clone());

        let err = gateway.delete_task("t-1").await.unwrap_err();
        assert!(matches!(err, GatewayError::Application { ref message } if message == "Task is running"));
        // Application failures are interpreted by callers, not the error hooks.
        assert!(log.paths.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_invalid_response() {
        let server = MockServer::start().await;
        respond(&server, "GET", "/tasks", ResponseTemplate::new(200).set_body_string("<html>")).await;

        let err = create_test_gateway(&server.uri()).list_tasks().await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_connection_error() {
        let log = Arc::new(FailureLog::default());
        let gateway = create_test_gateway("http://127.0.0.1:1").with_interceptor(log.clone());

        let err = gateway.list_tasks().await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Transport {
                kind: TransportKind::Connection,
                ..
            }
        ));
        assert!(err.is_transport());
        assert_eq!(*log.paths.lock().unwrap(), vec!["/tasks".to_string()]);
    }
}

#[cfg(test)]
mod post_response_failure_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_interrupted_body_notifies_once() {
        let base_url = truncated_body_server().await;
        let (ctx, notifier) = create_test_context(&base_url, signed_in_store());
        ctx.manager.restore().await.unwrap();
        ctx.navigator.set_current("/tasks");
        let store = TaskStore::new(ctx.gateway.clone(), ctx.notifier.clone());

        let err = store.refresh_list().await.unwrap_err();

        assert!(matches!(
            err,
            GatewayError::Transport {
                kind: TransportKind::Interrupted,
                ..
            }
        ));
        assert!(store.tasks().await.is_empty());
        assert_eq!(
            notifier.messages(NotificationLevel::Error),
            vec!["Connection interrupted, check the network and retry".to_string()]
        );
        assert!(ctx.manager.snapshot().await.is_authenticated());
    }

    #[tokio::test]
    async fn test_interrupted_download_notifies_once() {
        let base_url = truncated_body_server().await;
        let (ctx, notifier) = create_test_context(&base_url, signed_in_store());
        ctx.manager.restore().await.unwrap();

        let err = ctx
            .gateway
            .download_task("t-1", DownloadFormat::Json, &[])
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert_eq!(notifier.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_non_json_success_notifies_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
            .mount(&server)
            .await;

        let (ctx, notifier) = create_test_context(&server.uri(), signed_in_store());
        ctx.manager.restore().await.unwrap();
        let store = TaskStore::new(ctx.gateway.clone(), ctx.notifier.clone());

        let err = store.refresh_list().await.unwrap_err();

        assert!(matches!(err, GatewayError::InvalidResponse { .. }));
        assert_eq!(notifier.messages(NotificationLevel::Error).len(), 1);
        assert_eq!(notifier.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_identity_check_stays_silent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let (ctx, notifier) = create_test_context(&server.uri(), signed_in_store());
        ctx.manager.restore().await.unwrap();

        assert!(ctx.manager.hydrate().await.is_err());
        assert!(notifier.notifications().is_empty());
        assert!(ctx.manager.snapshot().await.is_authenticated());
    }
}
