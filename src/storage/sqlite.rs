use async_trait::async_trait;
use chrono::Utc;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::{SessionStore, TOKEN_KEY, USER_KEY};
use crate::config::StateConfig;
use crate::error::{StorageError, StorageResult};
use crate::models::UserProfile;

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed session store
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Open (or create) the state database at the configured path
    pub async fn new(config: &StateConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create state directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid state database URL: {}", e),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to open state database: {}", e),
            })?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create a store backed by a private in-memory database
    pub async fn new_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
            StorageError::Connection {
                message: format!("Invalid in-memory URL: {}", e),
            }
        })?;

        // A single connection that never recycles keeps the memory database alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to open in-memory database: {}", e),
            })?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Run database migrations using embedded sqlx migrations
    async fn run_migrations(&self) -> StorageResult<()> {
        debug!("Running state database migrations...");

        MIGRATOR.run(&self.pool).await.map_err(|e| StorageError::Migration {
            message: format!("Failed to run migrations: {}", e),
        })?;

        info!("State database ready");
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value: Option<(String,)> =
            sqlx::query_as("SELECT value FROM client_state WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value.map(|(v,)| v))
    }

    async fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO client_state (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM client_state WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load_token(&self) -> StorageResult<Option<String>> {
        self.get(TOKEN_KEY).await
    }

    async fn load_user(&self) -> StorageResult<Option<UserProfile>> {
        let Some(raw) = self.get(USER_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable user mirror");
                self.delete(USER_KEY).await?;
                Ok(None)
            }
        }
    }

    async fn save_token(&self, token: &str) -> StorageResult<()> {
        self.put(TOKEN_KEY, token).await
    }

    async fn save_user(&self, user: &UserProfile) -> StorageResult<()> {
        let raw = serde_json::to_string(user).map_err(|e| StorageError::Serialization {
            message: e.to_string(),
        })?;
        self.put(USER_KEY, &raw).await
    }

    async fn remove_user(&self) -> StorageResult<()> {
        self.delete(USER_KEY).await
    }

    async fn clear(&self) -> StorageResult<()> {
        sqlx::query("DELETE FROM client_state WHERE key IN (?, ?)")
            .bind(TOKEN_KEY)
            .bind(USER_KEY)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
