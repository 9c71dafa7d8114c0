use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::TaskStore;
use crate::config::MIN_POLL_INTERVAL_MS;

/// Cancellation handle for a running task list poller.
///
/// Dropping the handle cancels the poller. Refreshes already in flight run
/// to completion.
#[derive(Debug)]
pub struct PollHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop scheduling further ticks
    pub fn cancel(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some() && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel and wait for the ticker loop to exit
    pub async fn shutdown(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Task poller join failed");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl TaskStore {
    /// Refresh the task list every `interval` until the handle is cancelled.
    ///
    /// The first refresh happens one interval after the call. Every tick runs
    /// its refresh on its own task, so a slow or failing refresh never holds
    /// back the next tick. Intervals below `MIN_POLL_INTERVAL_MS` are raised
    /// to it.
    pub fn start_polling(&self, interval: Duration) -> PollHandle {
        let interval = interval.max(Duration::from_millis(MIN_POLL_INTERVAL_MS));
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let store = self.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let store = store.clone();
                        tokio::spawn(async move {
                            if let Err(error) = store.refresh_list().await {
                                warn!(error = %error, "Task polling refresh failed");
                            }
                        });
                    }
                }
            }
            debug!("Task poller stopped");
        });

        debug!(interval_ms = interval.as_millis() as u64, "Task poller started");
        PollHandle {
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }
}
