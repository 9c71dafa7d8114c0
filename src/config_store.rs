//! Working copy of the generation configuration.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::models::TaskConfig;
use crate::notify::{Notification, NotificationLevel, Notifier};

/// Holds the configuration edited before starting a task.
///
/// Starts from [`TaskConfig::defaults`]; the server copy is overlaid on load.
pub struct ConfigStore {
    gateway: Gateway,
    notifier: Arc<dyn Notifier>,
    config: RwLock<TaskConfig>,
}

impl ConfigStore {
    pub fn new(gateway: Gateway, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            config: RwLock::new(TaskConfig::defaults()),
        }
    }

    pub async fn config(&self) -> TaskConfig {
        self.config.read().await.clone()
    }

    /// Overlay the saved server config on the working copy.
    ///
    /// Any failure keeps the current config. Returns whether a server config
    /// was applied.
    pub async fn load(&self) -> bool {
        match self.gateway.load_config().await {
            Ok(loaded) => {
                let mut config = self.config.write().await;
                *config = loaded.merged_over(&config);
                debug!("Configuration loaded");
                true
            }
            Err(e) => {
                info!(error = %e, "Using default configuration");
                false
            }
        }
    }

    /// Persist the working copy on the server
    pub async fn save(&self) -> bool {
        let config = self.config().await;
        match self.gateway.save_config(&config).await {
            Ok(_) => {
                self.notifier.notify(Notification::new(
                    NotificationLevel::Success,
                    "Configuration saved",
                ));
                true
            }
            // Transport and HTTP failures were already reported by the gateway.
            Err(GatewayError::Application { message }) => {
                warn!(reason = %message, "Configuration save rejected");
                self.notifier.notify(Notification::new(
                    NotificationLevel::Error,
                    format!("Failed to save configuration: {}", message),
                ));
                false
            }
            Err(e) => {
                warn!(error = %e, "Configuration save failed");
                false
            }
        }
    }

    /// Edit the working copy in place
    pub async fn update<F>(&self, edit: F)
    where
        F: FnOnce(&mut TaskConfig),
    {
        edit(&mut *self.config.write().await);
    }

    /// Back to the console defaults
    pub async fn reset(&self) {
        *self.config.write().await = TaskConfig::defaults();
    }
}
