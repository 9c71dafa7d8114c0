//! Task reconciliation store.
//!
//! Holds the client's cached view of server-side tasks. The list is only
//! ever replaced wholesale by the latest authoritative answer; there is no
//! incremental merge.

mod poller;

pub use poller::PollHandle;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{Ack, Envelope, Gateway};
use crate::models::{CreateTaskRequest, Task, TaskConfig, TaskStats};
use crate::notify::{Notification, NotificationLevel, Notifier};

#[derive(Debug, Default)]
struct TaskView {
    tasks: Vec<Task>,
    current: Option<Task>,
}

/// Outcome of deleting several tasks one by one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteReport {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
}

impl BulkDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Decrements the in-flight counter when a load finishes, however it ends.
struct LoadingGuard(Arc<AtomicUsize>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Cached task list and current task, synchronized from the backend.
///
/// Cloning yields another handle to the same view.
#[derive(Clone)]
pub struct TaskStore {
    gateway: Gateway,
    notifier: Arc<dyn Notifier>,
    view: Arc<RwLock<TaskView>>,
    in_flight: Arc<AtomicUsize>,
}

impl TaskStore {
    pub fn new(gateway: Gateway, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            view: Arc::new(RwLock::new(TaskView::default())),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Snapshot of the cached list, in server order
    pub async fn tasks(&self) -> Vec<Task> {
        self.view.read().await.tasks.clone()
    }

    pub async fn current_task(&self) -> Option<Task> {
        self.view.read().await.current.clone()
    }

    pub async fn find(&self, task_id: &str) -> Option<Task> {
        self.view
            .read()
            .await
            .tasks
            .iter()
            .find(|t| t.task_id == task_id)
            .cloned()
    }

    /// Whether any list or detail fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    fn begin_loading(&self) -> LoadingGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        LoadingGuard(Arc::clone(&self.in_flight))
    }

    async fn replace_tasks(&self, tasks: Vec<Task>) {
        self.view.write().await.tasks = tasks;
    }

    /// Replace the cached list with the server's current list.
    ///
    /// - success: the list is replaced and its length returned
    /// - failure envelope: the list is emptied, a warning is shown and
    ///   `Ok(None)` is returned
    /// - any other error: the list is emptied and the error returned
    pub async fn refresh_list(&self) -> GatewayResult<Option<usize>> {
        let _loading = self.begin_loading();

        match self.gateway.list_tasks_envelope().await {
            Ok(Envelope {
                success: true,
                data: Some(tasks),
                ..
            }) => {
                let tasks = dedup_by_id(tasks);
                let count = tasks.len();
                self.replace_tasks(tasks).await;
                debug!(count, "Task list refreshed");
                Ok(Some(count))
            }
            Ok(envelope) if !envelope.success => {
                let reason = envelope.failure_message();
                warn!(reason = %reason, "Task list request rejected");
                self.replace_tasks(Vec::new()).await;
                self.notifier.notify(Notification::new(
                    NotificationLevel::Warning,
                    format!("Failed to load tasks: {}", reason),
                ));
                Ok(None)
            }
            Ok(_) => {
                self.replace_tasks(Vec::new()).await;
                Err(GatewayError::InvalidResponse {
                    message: "task list envelope without data".to_string(),
                })
            }
            Err(e) => {
                warn!(error = %e, "Task list refresh failed");
                self.replace_tasks(Vec::new()).await;
                Err(e)
            }
        }
    }

    /// Fetch one task and make it the current task.
    ///
    /// Failures leave the current task unchanged and are only logged.
    pub async fn refresh_one(&self, task_id: &str) -> Option<Task> {
        let _loading = self.begin_loading();

        match self.gateway.get_task(task_id).await {
            Ok(task) => {
                self.view.write().await.current = Some(task.clone());
                Some(task)
            }
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "Task detail refresh failed");
                None
            }
        }
    }

    /// Delete a task; the list is refreshed only after a confirmed delete.
    ///
    /// Returns `false` instead of failing, leaving the cached list as is.
    pub async fn delete_task(&self, task_id: &str) -> bool {
        match self.gateway.delete_task(task_id).await {
            Ok(_) => {
                info!(task_id = %task_id, "Task deleted");
                self.refresh_after_change().await;
                true
            }
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "Task delete failed");
                false
            }
        }
    }

    /// Delete every task in `task_ids`, continuing past failures
    pub async fn delete_many<I, S>(&self, task_ids: I) -> BulkDeleteReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = BulkDeleteReport::default();
        for task_id in task_ids {
            let task_id = task_id.as_ref();
            if self.delete_task(task_id).await {
                report.deleted.push(task_id.to_string());
            } else {
                report.failed.push(task_id.to_string());
            }
        }
        report
    }

    // ==================== Lifecycle ====================

    pub async fn create_task(&self, request: &CreateTaskRequest) -> GatewayResult<Ack> {
        let ack = self.gateway.create_task(request).await?;
        info!(task_name = %request.task_name, "Task created");
        self.refresh_after_change().await;
        Ok(ack)
    }

    pub async fn start_task(&self, task_id: &str, config: &TaskConfig) -> GatewayResult<Ack> {
        let ack = self.gateway.start_task(task_id, config).await?;
        self.refresh_after_change().await;
        Ok(ack)
    }

    pub async fn resume_task(&self, task_id: &str, config: &TaskConfig) -> GatewayResult<Ack> {
        let ack = self.gateway.resume_task(task_id, config).await?;
        self.refresh_after_change().await;
        Ok(ack)
    }

    pub async fn add_files(&self, task_id: &str, filepaths: &[String]) -> GatewayResult<Ack> {
        let ack = self.gateway.add_files_to_task(task_id, filepaths).await?;
        self.refresh_after_change().await;
        Ok(ack)
    }

    pub async fn remove_file(&self, task_id: &str, file_index: usize) -> GatewayResult<Ack> {
        let ack = self.gateway.remove_file_from_task(task_id, file_index).await?;
        self.refresh_after_change().await;
        Ok(ack)
    }

    /// Server-side summary counters
    pub async fn stats(&self) -> GatewayResult<TaskStats> {
        self.gateway.task_stats().await
    }

    /// Counters over the cached list
    pub async fn local_stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.view.read().await.tasks)
    }

    async fn refresh_after_change(&self) {
        if let Err(e) = self.refresh_list().await {
            warn!(error = %e, "Task list refresh after change failed");
        }
    }
}

/// Keep the first occurrence of each task id.
fn dedup_by_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    tasks
        .into_iter()
        .filter(|t| seen.insert(t.task_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;

    #[test]
    fn test_dedup_keeps_server_order() {
        let tasks = vec![
            Task::new("b", "second"),
            Task::new("a", "first"),
            Task::new("b", "duplicate").with_status(TaskStatus::Failed),
        ];
        let ids: Vec<_> = dedup_by_id(tasks)
            .into_iter()
            .map(|t| (t.task_id, t.task_name))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("b".to_string(), "second".to_string()),
                ("a".to_string(), "first".to_string())
            ]
        );
    }

    #[test]
    fn test_bulk_report_completeness() {
        let mut report = BulkDeleteReport::default();
        report.deleted.push("a".to_string());
        assert!(report.is_complete());
        report.failed.push("b".to_string());
        assert!(!report.is_complete());
    }
}
