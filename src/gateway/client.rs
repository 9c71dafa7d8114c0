use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::envelope::Envelope;
use super::interceptor::{CallContext, Interceptor};
use crate::config::{ApiConfig, RequestConfig};
use crate::error::{GatewayError, GatewayResult, TransportKind};

/// Header carrying the per-call correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP gateway to the console backend.
///
/// Executes calls against the API base URL, runs the interceptor chain and
/// classifies failures into [`GatewayError`] variants.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    request_config: RequestConfig,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Gateway {
    /// Create a new gateway with an empty interceptor chain
    pub fn new(config: &ApiConfig, request_config: RequestConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(GatewayError::Request)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_config,
            interceptors: Vec::new(),
        })
    }

    /// Append an interceptor to the chain
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of registered interceptors
    pub fn interceptor_count(&self) -> usize {
        self.interceptors.len()
    }

    /// Call an endpoint and decode its envelope.
    pub(crate) async fn call<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> GatewayResult<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (ctx, response) = self.send(method, path, query, body).await?;
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail(&ctx, self.transport_error(&e)).await),
        };

        let raw: Envelope<Value> = match serde_json::from_slice(&bytes) {
            Ok(raw) => raw,
            Err(e) => {
                let err = GatewayError::InvalidResponse {
                    message: format!("Failed to parse envelope: {}", e),
                };
                return Err(self.fail(&ctx, err).await);
            }
        };

        match raw.decode() {
            Ok(envelope) => Ok(envelope),
            Err(err) => Err(self.fail(&ctx, err).await),
        }
    }

    /// Call an endpoint that returns a file body.
    pub(crate) async fn call_bytes(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> GatewayResult<Vec<u8>> {
        let (ctx, response) = self.send::<()>(method, path, query, None).await?;
        match response.bytes().await {
            Ok(bytes) => Ok(bytes.to_vec()),
            Err(e) => Err(self.fail(&ctx, self.transport_error(&e)).await),
        }
    }

    /// Build, intercept, execute and classify a single request
    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> GatewayResult<(CallContext, Response)>
    where
        B: Serialize + ?Sized,
    {
        let ctx = CallContext::new(method.clone(), path);
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self.client.request(method, &url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let mut request = builder.build().map_err(GatewayError::Request)?;

        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
            request.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        for interceptor in &self.interceptors {
            interceptor.on_request(&ctx, &mut request).await?;
        }

        debug!(
            method = %ctx.method,
            path = %ctx.path,
            request_id = %ctx.request_id,
            "Calling console API"
        );

        let start = Instant::now();
        let result = match self.client.execute(request).await {
            Ok(response) => self.classify(&ctx, response).await,
            Err(e) => Err(self.transport_error(&e)),
        };
        let latency = start.elapsed();

        match result {
            Ok(response) => {
                debug!(
                    path = %ctx.path,
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Console API call succeeded"
                );
                Ok((ctx, response))
            }
            Err(error) => {
                debug!(path = %ctx.path, latency_ms = latency.as_millis(), "Console API call returned no usable response");
                Err(self.fail(&ctx, error).await)
            }
        }
    }

    /// Log a failed call and hand it to every interceptor's error hook.
    ///
    /// Failed requests, interrupted bodies and undecodable envelopes all end
    /// here. `success: false` answers do not; callers interpret those.
    async fn fail(&self, ctx: &CallContext, error: GatewayError) -> GatewayError {
        warn!(
            method = %ctx.method,
            path = %ctx.path,
            request_id = %ctx.request_id,
            error = %error,
            "Console API call failed"
        );
        for interceptor in &self.interceptors {
            interceptor.on_error(ctx, &error).await;
        }
        error
    }

    /// Map a non-success status to its error class
    async fn classify(&self, ctx: &CallContext, response: Response) -> GatewayResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_detail(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

        Err(match status {
            StatusCode::UNAUTHORIZED => GatewayError::Unauthorized { message },
            StatusCode::FORBIDDEN => GatewayError::Forbidden { message },
            StatusCode::NOT_FOUND if ctx.is_auth_path() => GatewayError::NotFoundIgnorable {
                path: ctx.path.clone(),
            },
            _ => GatewayError::Http {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Classify a failure where no usable response was received
    fn transport_error(&self, error: &reqwest::Error) -> GatewayError {
        let kind = if error.is_timeout() {
            TransportKind::Timeout
        } else if error.is_connect() {
            TransportKind::Connection
        } else if error.is_body() || error.is_decode() {
            TransportKind::Interrupted
        } else {
            TransportKind::Other
        };

        let message = match kind {
            TransportKind::Timeout => {
                format!("no response within {}ms", self.request_config.timeout_ms)
            }
            _ => error.to_string(),
        };

        GatewayError::Transport { kind, message }
    }
}

/// Extract a human-readable message from an error body.
///
/// FastAPI puts it in `detail`; envelope-shaped bodies use `error`/`message`.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "error", "message"]
        .iter()
        .find_map(|key| match value.get(key) {
            Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
            Some(other) if !other.is_null() => Some(other.to_string()),
            _ => None,
        })
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
}
