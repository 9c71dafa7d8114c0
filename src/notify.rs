//! User-facing notifications.
//!
//! Components report things the user should see (a failed refresh, missing
//! permissions, a saved config) through a [`Notifier`]. How they are shown is
//! up to the embedding surface; the default just logs them.

use std::sync::Mutex;

use tracing::{error, info, warn};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A single user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Sink for user-facing notifications
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Emits notifications as tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success | NotificationLevel::Info => {
                info!(target: "console::notify", "{}", notification.message)
            }
            NotificationLevel::Warning => {
                warn!(target: "console::notify", "{}", notification.message)
            }
            NotificationLevel::Error => {
                error!(target: "console::notify", "{}", notification.message)
            }
        }
    }
}

/// Keeps every notification in memory, for assertions and CLI summaries
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }

    /// Recorded messages at `level`
    pub fn messages(&self, level: NotificationLevel) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_filters_by_level() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::new(NotificationLevel::Error, "boom"));
        notifier.notify(Notification::new(NotificationLevel::Warning, "careful"));
        notifier.notify(Notification::new(NotificationLevel::Error, "again"));

        assert_eq!(notifier.notifications().len(), 3);
        assert_eq!(
            notifier.messages(NotificationLevel::Error),
            vec!["boom".to_string(), "again".to_string()]
        );
    }
}
