use serde_json::Value;

use crate::error::{ReviewError, ReviewResult};
use crate::models::{AutoReviewRequest, ReviewStatus};

fn invalid(field: &str, reason: impl Into<String>) -> ReviewError {
    ReviewError::Validation {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// A single manual review, validated before it is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDraft {
    pub item_id: String,
    pub status: ReviewStatus,
    pub comment: Option<String>,
    pub modified_content: Option<Value>,
}

impl ReviewDraft {
    pub fn new(item_id: impl Into<String>, status: ReviewStatus) -> Self {
        Self {
            item_id: item_id.into(),
            status,
            comment: None,
            modified_content: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Attach replacement content; the item becomes `Modified`.
    pub fn with_modified_content(mut self, content: Value) -> Self {
        self.modified_content = Some(content);
        self.status = ReviewStatus::Modified;
        self
    }

    /// Status the item will be sent with, after applying the content rules
    pub fn effective_status(&self) -> ReviewStatus {
        if self.modified_content.is_some() {
            ReviewStatus::Modified
        } else {
            self.status
        }
    }

    pub fn validate(&self) -> ReviewResult<()> {
        if self.item_id.trim().is_empty() {
            return Err(invalid("item_id", "must not be empty"));
        }
        let status = self.effective_status();
        if !status.is_manual_target() {
            return Err(invalid(
                "review_status",
                format!("{} is only assigned by auto review", status),
            ));
        }
        if status == ReviewStatus::Modified && self.modified_content.is_none() {
            return Err(invalid("modified_content", "required for modified status"));
        }
        Ok(())
    }
}

/// Validate the status of a batch review
pub(crate) fn validate_batch(item_ids: &[String], status: ReviewStatus) -> ReviewResult<()> {
    if item_ids.is_empty() {
        return Err(invalid("item_ids", "select at least one item"));
    }
    if !status.is_manual_target() {
        return Err(invalid(
            "review_status",
            format!("{} is only assigned by auto review", status),
        ));
    }
    if status == ReviewStatus::Modified {
        return Err(invalid(
            "review_status",
            "modified needs per-item content and cannot be batch applied",
        ));
    }
    Ok(())
}

/// Settings of an auto review run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoReviewOptions {
    /// Score at or above which items are approved.
    pub threshold: f64,
    pub auto_approve: bool,
    pub auto_reject: bool,
}

impl Default for AutoReviewOptions {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            auto_approve: true,
            auto_reject: false,
        }
    }
}

impl AutoReviewOptions {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn validate(&self) -> ReviewResult<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(invalid("threshold", "must be between 0 and 1"));
        }
        Ok(())
    }

    pub(crate) fn into_request(self, item_ids: Vec<String>) -> ReviewResult<AutoReviewRequest> {
        self.validate()?;
        if item_ids.is_empty() {
            return Err(invalid("item_ids", "select at least one item"));
        }
        Ok(AutoReviewRequest {
            item_ids,
            threshold: self.threshold,
            auto_approve: self.auto_approve,
            auto_reject: self.auto_reject,
        })
    }
}
