//! User record store abstraction and implementations

pub mod memory;
pub mod user_repo;

pub use memory::InMemoryUserStore;
pub use user_repo::PgUserStore;

use crate::models::user::{Identifier, UserRecord};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Key-value store of user records keyed by normalized identifier.
///
/// `insert_if_absent` must be atomic: of two concurrent inserts for the same
/// identifier exactly one returns `true`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, identifier: &Identifier) -> Result<Option<UserRecord>, StoreError>;

    /// Returns `false` if the identifier already existed.
    async fn insert_if_absent(&self, record: UserRecord) -> Result<bool, StoreError>;
}
