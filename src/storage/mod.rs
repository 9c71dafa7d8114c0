//! Persisted client state.
//!
//! The console keeps exactly two durable entries: the session token and a
//! serialized mirror of the user profile. Only the session module writes
//! them.

mod memory;
mod sqlite;

pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::models::UserProfile;

/// Key of the persisted session token.
pub const TOKEN_KEY: &str = "token";
/// Key of the persisted user profile mirror.
pub const USER_KEY: &str = "user";

/// Durable key-value storage for the session token and user mirror.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the persisted token.
    async fn load_token(&self) -> StorageResult<Option<String>>;

    /// Read the persisted user mirror.
    ///
    /// A mirror that no longer deserializes is removed and reported as absent.
    async fn load_user(&self) -> StorageResult<Option<UserProfile>>;

    /// Persist the token.
    async fn save_token(&self, token: &str) -> StorageResult<()>;

    /// Persist the user mirror.
    async fn save_user(&self, user: &UserProfile) -> StorageResult<()>;

    /// Remove the user mirror only.
    async fn remove_user(&self) -> StorageResult<()>;

    /// Remove both entries.
    async fn clear(&self) -> StorageResult<()>;
}
