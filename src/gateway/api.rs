//! Typed endpoint wrappers over [`Gateway`].

use reqwest::Method;
use serde_json::{json, Value};

use super::client::Gateway;
use super::envelope::{Ack, Envelope};
use super::interceptor::{IDENTITY_PROBE_PATH, LOGIN_PATH};
use crate::error::{GatewayError, GatewayResult};
use crate::models::{
    AutoReviewRequest, BatchReviewRequest, BatchReviewSummary, ChangePasswordRequest,
    CreateTaskRequest, DownloadFormat, LoginRequest, LoginResponse, RegisterRequest,
    ReviewRequest, ReviewStats, ReviewStatus, ReviewableItem, Task, TaskConfig, TaskStats,
    TestConnectionRequest, UserProfile, UserUpdate,
};

const NO_QUERY: &[(&str, String)] = &[];

fn download_query(format: DownloadFormat, optional_fields: &[String]) -> Vec<(&'static str, String)> {
    vec![
        ("format", format.as_str().to_string()),
        ("optional_fields", optional_fields.join(",")),
    ]
}

impl Gateway {
    // ==================== Health ====================

    /// `GET /health`
    ///
    /// Health answers with a bare object rather than an envelope.
    pub async fn health_check(&self) -> GatewayResult<Value> {
        let body = self.call_bytes(Method::GET, "/health", NO_QUERY).await?;
        serde_json::from_slice(&body).map_err(|e| GatewayError::InvalidResponse {
            message: format!("Failed to parse health response: {}", e),
        })
    }

    /// `POST /test-connection`
    pub async fn test_connection(&self, request: &TestConnectionRequest) -> GatewayResult<Ack> {
        self.ack(Method::POST, "/test-connection", Some(request)).await
    }

    // ==================== Tasks ====================

    /// `GET /tasks` as a raw envelope, so callers can tell an application
    /// failure from a transport failure.
    pub async fn list_tasks_envelope(&self) -> GatewayResult<Envelope<Vec<Task>>> {
        let mut envelope: Envelope<Vec<Task>> = self
            .call::<_, ()>(Method::GET, "/tasks", NO_QUERY, None)
            .await?;
        envelope.data = envelope
            .data
            .map(|tasks| tasks.into_iter().map(Task::normalized).collect());
        Ok(envelope)
    }

    /// `GET /tasks`
    pub async fn list_tasks(&self) -> GatewayResult<Vec<Task>> {
        self.list_tasks_envelope().await?.into_data()
    }

    /// `GET /tasks/{id}`
    pub async fn get_task(&self, task_id: &str) -> GatewayResult<Task> {
        let envelope: Envelope<Task> = self
            .call::<_, ()>(Method::GET, &format!("/tasks/{}", task_id), NO_QUERY, None)
            .await?;
        Ok(envelope.into_data()?.normalized())
    }

    /// `POST /tasks`
    pub async fn create_task(&self, request: &CreateTaskRequest) -> GatewayResult<Ack> {
        self.ack(Method::POST, "/tasks", Some(request)).await
    }

    /// `POST /tasks/{id}/start`
    pub async fn start_task(&self, task_id: &str, config: &TaskConfig) -> GatewayResult<Ack> {
        self.ack(Method::POST, &format!("/tasks/{}/start", task_id), Some(config))
            .await
    }

    /// `POST /tasks/{id}/resume`
    pub async fn resume_task(&self, task_id: &str, config: &TaskConfig) -> GatewayResult<Ack> {
        self.ack(Method::POST, &format!("/tasks/{}/resume", task_id), Some(config))
            .await
    }

    /// `POST /tasks/{id}/files`
    pub async fn add_files_to_task(&self, task_id: &str, filepaths: &[String]) -> GatewayResult<Ack> {
        let body = json!({ "filepaths": filepaths });
        self.ack(Method::POST, &format!("/tasks/{}/files", task_id), Some(&body))
            .await
    }

    /// `DELETE /tasks/{id}/files/{index}`
    pub async fn remove_file_from_task(&self, task_id: &str, file_index: usize) -> GatewayResult<Ack> {
        self.ack::<()>(
            Method::DELETE,
            &format!("/tasks/{}/files/{}", task_id, file_index),
            None,
        )
        .await
    }

    /// `DELETE /tasks/{id}`
    pub async fn delete_task(&self, task_id: &str) -> GatewayResult<Ack> {
        self.ack::<()>(Method::DELETE, &format!("/tasks/{}", task_id), None)
            .await
    }

    /// `GET /tasks/{id}/source`
    pub async fn get_task_source(&self, task_id: &str, file_index: usize) -> GatewayResult<Value> {
        let envelope: Envelope<Value> = self
            .call::<_, ()>(
                Method::GET,
                &format!("/tasks/{}/source", task_id),
                &[("file_index", file_index.to_string())],
                None,
            )
            .await?;
        Ok(envelope.into_result()?.unwrap_or(Value::Null))
    }

    /// `GET /tasks/{id}/download`
    pub async fn download_task(
        &self,
        task_id: &str,
        format: DownloadFormat,
        optional_fields: &[String],
    ) -> GatewayResult<Vec<u8>> {
        self.call_bytes(
            Method::GET,
            &format!("/tasks/{}/download", task_id),
            &download_query(format, optional_fields),
        )
        .await
    }

    /// `GET /tasks/stats/summary`
    pub async fn task_stats(&self) -> GatewayResult<TaskStats> {
        let envelope: Envelope<TaskStats> = self
            .call::<_, ()>(Method::GET, "/tasks/stats/summary", NO_QUERY, None)
            .await?;
        envelope.into_data()
    }

    // ==================== Config ====================

    /// `GET /config/load`
    pub async fn load_config(&self) -> GatewayResult<TaskConfig> {
        let envelope: Envelope<TaskConfig> = self
            .call::<_, ()>(Method::GET, "/config/load", NO_QUERY, None)
            .await?;
        envelope.into_data()
    }

    /// `POST /config/save`
    pub async fn save_config(&self, config: &TaskConfig) -> GatewayResult<Ack> {
        self.ack(Method::POST, "/config/save", Some(config)).await
    }

    // ==================== Review ====================

    /// `GET /reviews/{task}/data`
    pub async fn review_data(&self, task_id: &str) -> GatewayResult<Vec<ReviewableItem>> {
        let envelope: Envelope<Vec<ReviewableItem>> = self
            .call::<_, ()>(Method::GET, &format!("/reviews/{}/data", task_id), NO_QUERY, None)
            .await?;
        envelope.into_data()
    }

    /// `GET /reviews/{task}/stats`
    pub async fn review_stats(&self, task_id: &str) -> GatewayResult<ReviewStats> {
        let envelope: Envelope<ReviewStats> = self
            .call::<_, ()>(Method::GET, &format!("/reviews/{}/stats", task_id), NO_QUERY, None)
            .await?;
        envelope.into_data()
    }

    /// `POST /reviews/review`
    pub async fn review_item(&self, request: &ReviewRequest) -> GatewayResult<Option<ReviewableItem>> {
        let envelope: Envelope<ReviewableItem> = self
            .call(Method::POST, "/reviews/review", NO_QUERY, Some(request))
            .await?;
        envelope.into_result()
    }

    /// `POST /reviews/batch-review`
    pub async fn batch_review(
        &self,
        request: &BatchReviewRequest,
    ) -> GatewayResult<Option<BatchReviewSummary>> {
        let envelope: Envelope<BatchReviewSummary> = self
            .call(Method::POST, "/reviews/batch-review", NO_QUERY, Some(request))
            .await?;
        envelope.into_result()
    }

    /// `POST /reviews/auto-review`
    pub async fn auto_review(
        &self,
        request: &AutoReviewRequest,
    ) -> GatewayResult<Option<BatchReviewSummary>> {
        // The auto reviewer reports per-item results under a different shape;
        // only the counters are kept.
        let envelope: Envelope<Value> = self
            .call(Method::POST, "/reviews/auto-review", NO_QUERY, Some(request))
            .await?;
        Ok(envelope
            .into_result()?
            .and_then(|data| serde_json::from_value(data).ok()))
    }

    /// `GET /reviews/{task}/export`
    pub async fn export_reviewed(
        &self,
        task_id: &str,
        status_filter: &[ReviewStatus],
    ) -> GatewayResult<Ack> {
        let query: Vec<(&str, String)> = if status_filter.is_empty() {
            Vec::new()
        } else {
            let joined = status_filter
                .iter()
                .map(ReviewStatus::as_str)
                .collect::<Vec<_>>()
                .join(",");
            vec![("status_filter", joined)]
        };
        let envelope: Envelope<Value> = self
            .call::<_, ()>(
                Method::GET,
                &format!("/reviews/{}/export", task_id),
                &query,
                None,
            )
            .await?;
        let message = envelope.message.clone();
        let data = envelope.into_result()?;
        Ok(Ack { message, data })
    }

    /// `GET /reviews/{task}/download`
    pub async fn download_reviewed(
        &self,
        task_id: &str,
        format: DownloadFormat,
        optional_fields: &[String],
    ) -> GatewayResult<Vec<u8>> {
        self.call_bytes(
            Method::GET,
            &format!("/reviews/{}/download", task_id),
            &download_query(format, optional_fields),
        )
        .await
    }

    // ==================== Auth ====================

    /// `POST /auth/login` as a raw envelope; a failed login is an ordinary
    /// `success: false` answer.
    pub async fn login(&self, username: &str, password: &str) -> GatewayResult<Envelope<LoginResponse>> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.call(Method::POST, LOGIN_PATH, NO_QUERY, Some(&request))
            .await
    }

    /// `POST /auth/register` (admin)
    pub async fn register(&self, request: &RegisterRequest) -> GatewayResult<Ack> {
        self.ack(Method::POST, "/auth/register", Some(request)).await
    }

    /// `GET /auth/me`, the identity probe
    pub async fn me(&self) -> GatewayResult<Envelope<UserProfile>> {
        self.call::<_, ()>(Method::GET, IDENTITY_PROBE_PATH, NO_QUERY, None)
            .await
    }

    /// `POST /auth/change-password`
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> GatewayResult<Envelope<Value>> {
        let request = ChangePasswordRequest {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.call(Method::POST, "/auth/change-password", NO_QUERY, Some(&request))
            .await
    }

    /// `GET /auth/users` (admin)
    pub async fn list_users(&self) -> GatewayResult<Vec<UserProfile>> {
        let envelope: Envelope<Vec<UserProfile>> = self
            .call::<_, ()>(Method::GET, "/auth/users", NO_QUERY, None)
            .await?;
        envelope.into_data()
    }

    /// `PUT /auth/users/{username}` (admin)
    pub async fn update_user(&self, username: &str, update: &UserUpdate) -> GatewayResult<Ack> {
        self.ack(Method::PUT, &format!("/auth/users/{}", username), Some(update))
            .await
    }

    /// `DELETE /auth/users/{username}` (admin)
    pub async fn delete_user(&self, username: &str) -> GatewayResult<Ack> {
        self.ack::<()>(Method::DELETE, &format!("/auth/users/{}", username), None)
            .await
    }

    /// Call an endpoint whose payload is only a confirmation
    async fn ack<B>(&self, method: Method, path: &str, body: Option<&B>) -> GatewayResult<Ack>
    where
        B: serde::Serialize + ?Sized,
    {
        let envelope: Envelope<Value> = self.call(method, path, NO_QUERY, body).await?;
        let message = envelope.message.clone();
        let data = envelope.into_result()?;
        Ok(Ack { message, data })
    }
}
