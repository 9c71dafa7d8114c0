//! Review workspace.
//!
//! Holds the working copy of one task's generated items while a reviewer
//! works through them. The workspace never changes an item's status on its
//! own: every mutation goes to the server first and the items are re-fetched
//! once it confirms.

mod draft;

pub use draft::{AutoReviewOptions, ReviewDraft};

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{GatewayError, ReviewError, ReviewResult};
use crate::gateway::{Ack, Gateway};
use crate::models::{
    BatchReviewRequest, BatchReviewSummary, DownloadFormat, ReviewRequest, ReviewStats,
    ReviewStatus, ReviewableItem,
};
use crate::notify::{Notification, NotificationLevel, Notifier};
use crate::session::SharedSession;

#[derive(Debug, Default)]
struct WorkspaceState {
    task_id: Option<String>,
    items: Vec<ReviewableItem>,
}

/// Working copy of the items of one task
pub struct ReviewWorkspace {
    gateway: Gateway,
    session: SharedSession,
    notifier: Arc<dyn Notifier>,
    state: RwLock<WorkspaceState>,
}

impl ReviewWorkspace {
    pub fn new(gateway: Gateway, session: SharedSession, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            session,
            notifier,
            state: RwLock::new(WorkspaceState::default()),
        }
    }

    /// Fetch the items of `task_id` and make it the workspace task
    pub async fn load(&self, task_id: &str) -> ReviewResult<usize> {
        let items = self.gateway.review_data(task_id).await?;
        let count = items.len();

        let mut state = self.state.write().await;
        state.task_id = Some(task_id.to_string());
        state.items = items;
        debug!(task_id = %task_id, count, "Review items loaded");
        Ok(count)
    }

    pub async fn task_id(&self) -> Option<String> {
        self.state.read().await.task_id.clone()
    }

    pub async fn items(&self) -> Vec<ReviewableItem> {
        self.state.read().await.items.clone()
    }

    pub async fn item(&self, item_id: &str) -> Option<ReviewableItem> {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|item| item.item_id == item_id)
            .cloned()
    }

    /// Items currently in `status`
    pub async fn items_with_status(&self, status: ReviewStatus) -> Vec<ReviewableItem> {
        self.state
            .read()
            .await
            .items
            .iter()
            .filter(|item| item.review_status == status)
            .cloned()
            .collect()
    }

    /// Review one item
    pub async fn review(&self, draft: ReviewDraft) -> ReviewResult<Option<ReviewableItem>> {
        draft.validate()?;
        let task_id = self.require_task().await?;

        let request = ReviewRequest {
            task_id: task_id.clone(),
            item_id: draft.item_id.clone(),
            review_status: draft.effective_status(),
            review_comment: draft.comment,
            reviewer: self.reviewer().await,
            modified_content: draft.modified_content,
        };

        let updated = self.confirm(self.gateway.review_item(&request).await)?;
        info!(task_id = %task_id, item_id = %request.item_id, status = %request.review_status, "Item reviewed");
        self.reload(&task_id).await;
        Ok(updated)
    }

    /// Apply one status to several items as a single operation.
    ///
    /// The returned summary is informational; the re-fetched items are the
    /// source of truth for per-item outcomes.
    pub async fn batch_review(
        &self,
        item_ids: Vec<String>,
        status: ReviewStatus,
        comment: Option<String>,
    ) -> ReviewResult<Option<BatchReviewSummary>> {
        draft::validate_batch(&item_ids, status)?;
        let task_id = self.require_task().await?;

        let request = BatchReviewRequest {
            task_id: task_id.clone(),
            item_ids,
            review_status: status,
            review_comment: comment,
            reviewer: self.reviewer().await,
        };

        let summary = self.confirm(self.gateway.batch_review(&request).await)?;
        info!(task_id = %task_id, count = request.item_ids.len(), status = %status, "Batch review applied");
        self.reload(&task_id).await;
        Ok(summary)
    }

    /// Let the server's auto reviewer score and classify `item_ids`
    pub async fn auto_review(
        &self,
        item_ids: Vec<String>,
        options: AutoReviewOptions,
    ) -> ReviewResult<Option<BatchReviewSummary>> {
        let request = options.into_request(item_ids)?;
        let task_id = self.require_task().await?;

        let summary = self.confirm(self.gateway.auto_review(&request).await)?;
        info!(task_id = %task_id, count = request.item_ids.len(), threshold = request.threshold, "Auto review finished");
        self.reload(&task_id).await;
        Ok(summary)
    }

    /// Server-side counters of the workspace task
    pub async fn stats(&self) -> ReviewResult<ReviewStats> {
        let task_id = self.require_task().await?;
        Ok(self.gateway.review_stats(&task_id).await?)
    }

    /// Counters over the working copy
    pub async fn local_stats(&self) -> ReviewStats {
        ReviewStats::from_items(&self.state.read().await.items)
    }

    /// Export reviewed items on the server, optionally limited to statuses
    pub async fn export(&self, status_filter: &[ReviewStatus]) -> ReviewResult<Ack> {
        let task_id = self.require_task().await?;
        let ack = self.confirm(self.gateway.export_reviewed(&task_id, status_filter).await)?;
        Ok(ack)
    }

    /// Download reviewed items in `format`
    pub async fn download(
        &self,
        format: DownloadFormat,
        optional_fields: &[String],
    ) -> ReviewResult<Vec<u8>> {
        let task_id = self.require_task().await?;
        Ok(self
            .gateway
            .download_reviewed(&task_id, format, optional_fields)
            .await?)
    }

    async fn require_task(&self) -> ReviewResult<String> {
        self.task_id().await.ok_or_else(|| ReviewError::Validation {
            field: "task_id".to_string(),
            reason: "no task loaded".to_string(),
        })
    }

    async fn reviewer(&self) -> Option<String> {
        self.session.user().await.map(|user| user.username)
    }

    /// Surface a rejected mutation to the user; other failures were already
    /// reported by the gateway.
    fn confirm<T>(&self, result: Result<T, GatewayError>) -> ReviewResult<T> {
        result.map_err(|e| {
            if let GatewayError::Application { message } = &e {
                self.notifier.notify(Notification::new(
                    NotificationLevel::Error,
                    format!("Review failed: {}", message),
                ));
            }
            ReviewError::Gateway(e)
        })
    }

    async fn reload(&self, task_id: &str) {
        if let Err(e) = self.load(task_id).await {
            warn!(task_id = %task_id, error = %e, "Review items re-fetch failed");
        }
    }
}
