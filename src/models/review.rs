use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Review classification of a generated data item.
///
/// Statuses are revisable: a reviewed item can be sent back to `Pending`
/// or re-reviewed into any manual status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Modified,
    AutoApproved,
    AutoRejected,
}

impl ReviewStatus {
    /// All statuses in display order.
    pub const ALL: [ReviewStatus; 6] = [
        ReviewStatus::Pending,
        ReviewStatus::Approved,
        ReviewStatus::Rejected,
        ReviewStatus::Modified,
        ReviewStatus::AutoApproved,
        ReviewStatus::AutoRejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
            ReviewStatus::Modified => "modified",
            ReviewStatus::AutoApproved => "auto_approved",
            ReviewStatus::AutoRejected => "auto_rejected",
        }
    }

    /// Assigned by the auto reviewer, never by a person.
    pub fn is_automatic(&self) -> bool {
        matches!(self, ReviewStatus::AutoApproved | ReviewStatus::AutoRejected)
    }

    /// Anything but `Pending`.
    pub fn is_reviewed(&self) -> bool {
        !matches!(self, ReviewStatus::Pending)
    }

    /// Whether a reviewer may set this status by hand.
    pub fn is_manual_target(&self) -> bool {
        !self.is_automatic()
    }

    /// Whether a manual review may move an item from `self` to `target`.
    ///
    /// The source status never restricts the move; only automatic targets
    /// are refused.
    pub fn can_review_to(&self, target: ReviewStatus) -> bool {
        target.is_manual_target()
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReviewStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown review status: {}", s))
    }
}

/// A generated data item under review (`DataItem` on the wire)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewableItem {
    pub item_id: String,
    pub task_id: String,
    /// Alpaca, ShareGPT or ChatML record; kept opaque.
    pub content: Value,
    #[serde(default)]
    pub review_status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_review_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_review_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_content: Option<Value>,
}

impl ReviewableItem {
    /// Create a pending item
    pub fn new(item_id: impl Into<String>, task_id: impl Into<String>, content: Value) -> Self {
        Self {
            item_id: item_id.into(),
            task_id: task_id.into(),
            content,
            review_status: ReviewStatus::Pending,
            review_comment: None,
            reviewer: None,
            review_time: None,
            auto_review_score: None,
            auto_review_reason: None,
            modified_content: None,
        }
    }

    /// Set review status
    pub fn with_status(mut self, status: ReviewStatus) -> Self {
        self.review_status = status;
        self
    }

    /// The content that would be exported: the override when present.
    pub fn effective_content(&self) -> &Value {
        self.modified_content.as_ref().unwrap_or(&self.content)
    }
}

/// Body of `POST /reviews/review`
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequest {
    pub task_id: String,
    pub item_id: String,
    pub review_status: ReviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_content: Option<Value>,
}

/// Body of `POST /reviews/batch-review`
#[derive(Debug, Clone, Serialize)]
pub struct BatchReviewRequest {
    pub task_id: String,
    pub item_ids: Vec<String>,
    pub review_status: ReviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,
}

/// Body of `POST /reviews/auto-review`
#[derive(Debug, Clone, Serialize)]
pub struct AutoReviewRequest {
    pub item_ids: Vec<String>,
    pub threshold: f64,
    pub auto_approve: bool,
    pub auto_reject: bool,
}

/// Per-item failure reported inside a bulk review response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemError {
    pub item_id: String,
    #[serde(default)]
    pub error: String,
}

/// Aggregate result of a batch or auto review.
///
/// Informational only; per-item outcomes are learned by re-fetching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReviewSummary {
    #[serde(default)]
    pub success_count: usize,
    #[serde(default)]
    pub error_count: usize,
    #[serde(default)]
    pub errors: Vec<ItemError>,
}

impl BatchReviewSummary {
    pub fn is_partial(&self) -> bool {
        self.error_count > 0 && self.success_count > 0
    }
}

/// Per-status item counts for one task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub pending: usize,
    #[serde(default)]
    pub approved: usize,
    #[serde(default)]
    pub rejected: usize,
    #[serde(default)]
    pub modified: usize,
    #[serde(default)]
    pub auto_approved: usize,
    #[serde(default)]
    pub auto_rejected: usize,
}

impl ReviewStats {
    /// Count a working copy locally
    pub fn from_items(items: &[ReviewableItem]) -> Self {
        let mut stats = Self {
            total: items.len(),
            ..Self::default()
        };
        for item in items {
            match item.review_status {
                ReviewStatus::Pending => stats.pending += 1,
                ReviewStatus::Approved => stats.approved += 1,
                ReviewStatus::Rejected => stats.rejected += 1,
                ReviewStatus::Modified => stats.modified += 1,
                ReviewStatus::AutoApproved => stats.auto_approved += 1,
                ReviewStatus::AutoRejected => stats.auto_rejected += 1,
            }
        }
        stats
    }

    /// Fraction of items that are no longer pending
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.total - self.pending) as f64 / self.total as f64
    }
}
