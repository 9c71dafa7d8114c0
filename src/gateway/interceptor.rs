use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, Request};

use crate::error::{GatewayError, GatewayResult};
use crate::session::SharedSession;

/// Path of the identity probe used during hydration.
pub const IDENTITY_PROBE_PATH: &str = "/auth/me";
/// Path of the credential exchange.
pub const LOGIN_PATH: &str = "/auth/login";

/// What an interceptor knows about the call in flight
#[derive(Debug, Clone)]
pub struct CallContext {
    pub method: Method,
    /// Path relative to the API base, e.g. `/tasks/abc`.
    pub path: String,
    pub request_id: String,
}

impl CallContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// The `/auth/me` call whose failures hydration handles itself.
    pub fn is_identity_probe(&self) -> bool {
        self.path == IDENTITY_PROBE_PATH
    }

    /// The login call; a 401 there is a rejected credential, not an
    /// expired session.
    pub fn is_login(&self) -> bool {
        self.path == LOGIN_PATH
    }

    pub fn is_auth_path(&self) -> bool {
        self.path.contains("/auth/")
    }
}

/// One link of the gateway's middleware chain.
///
/// Interceptors run in registration order: `on_request` before the request
/// is sent, `on_error` after a call failed at the HTTP or transport level.
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn on_request(&self, _ctx: &CallContext, _request: &mut Request) -> GatewayResult<()> {
        Ok(())
    }

    async fn on_error(&self, _ctx: &CallContext, _error: &GatewayError) {}
}

/// Attaches the session token as a bearer credential
pub struct BearerAuth {
    session: SharedSession,
}

impl BearerAuth {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Interceptor for BearerAuth {
    async fn on_request(&self, _ctx: &CallContext, request: &mut Request) -> GatewayResult<()> {
        if let Some(token) = self.session.token().await {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                GatewayError::InvalidRequest {
                    message: format!("Token is not a valid header value: {}", e),
                }
            })?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Ok(())
    }
}
