//! Persistence layer. Owns the `users` and `anquettes` tables and knows
//! nothing about business rules; callers get a single `NotFound` outcome
//! for missing rows regardless of backend.

pub mod memory;
pub mod sqlite;

use std::time::Duration;

use async_trait::async_trait;

use crate::anquettes::dto::{Anquette, AnquetteRequest};
use crate::users::dto::{User, UserRequest};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no matching row")]
    NotFound,

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("query exceeded deadline of {0:?}")]
    Timeout(Duration),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Schema: Send + Sync {
    /// Create both tables if absent. Safe to call on every startup.
    async fn create_schema(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert_user(&self, u: &UserRequest) -> StoreResult<i64>;
    async fn get_user(&self, id: i64) -> StoreResult<User>;
    async fn update_user(&self, id: i64, u: &UserRequest) -> StoreResult<()>;
}

#[async_trait]
pub trait AnquetteRepository: Send + Sync {
    async fn insert_anquette(&self, a: &AnquetteRequest) -> StoreResult<i64>;
    async fn get_anquette(&self, id: i64) -> StoreResult<Anquette>;
    async fn update_anquette(&self, id: i64, a: &AnquetteRequest) -> StoreResult<()>;
    async fn delete_anquette(&self, id: i64) -> StoreResult<()>;
}

/// A complete backend: schema plus both repositories.
pub trait Store: Schema + UserRepository + AnquetteRepository {}

impl<T> Store for T where T: Schema + UserRepository + AnquetteRepository {}
