use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::warn;

use super::{SessionStore, TOKEN_KEY, USER_KEY};
use crate::error::{StorageError, StorageResult};
use crate::models::UserProfile;

/// In-process session store; nothing survives the process.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store as if a previous run had persisted these entries
    pub fn with_entries(token: Option<&str>, user: Option<&UserProfile>) -> Self {
        let mut entries = HashMap::new();
        if let Some(token) = token {
            entries.insert(TOKEN_KEY.to_string(), token.to_string());
        }
        if let Some(user) = user {
            if let Ok(raw) = serde_json::to_string(user) {
                entries.insert(USER_KEY.to_string(), raw);
            }
        }
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Store a raw value under `key`, bypassing serialization.
    pub async fn put_raw(&self, key: &str, value: &str) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }

    /// Raw value under `key`.
    pub async fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load_token(&self) -> StorageResult<Option<String>> {
        Ok(self.get_raw(TOKEN_KEY).await)
    }

    async fn load_user(&self) -> StorageResult<Option<UserProfile>> {
        let mut entries = self.entries.write().await;
        let Some(raw) = entries.get(USER_KEY) else {
            return Ok(None);
        };

        match serde_json::from_str(raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable user mirror");
                entries.remove(USER_KEY);
                Ok(None)
            }
        }
    }

    async fn save_token(&self, token: &str) -> StorageResult<()> {
        self.put_raw(TOKEN_KEY, token).await;
        Ok(())
    }

    async fn save_user(&self, user: &UserProfile) -> StorageResult<()> {
        let raw = serde_json::to_string(user).map_err(|e| StorageError::Serialization {
            message: e.to_string(),
        })?;
        self.put_raw(USER_KEY, &raw).await;
        Ok(())
    }

    async fn remove_user(&self) -> StorageResult<()> {
        self.entries.write().await.remove(USER_KEY);
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        let mut entries = self.entries.write().await;
        entries.remove(TOKEN_KEY);
        entries.remove(USER_KEY);
        Ok(())
    }
}
