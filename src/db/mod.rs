//! Storage seam. Core services only see the two repository traits; the
//! backends live in [`postgres`] and [`memory`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::note::Note;
use crate::models::user::{NewUser, User};

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. Must fail with [`StoreError::UniqueViolation`] when the
    /// email is already present, atomically with the insert.
    async fn insert(&self, user: NewUser) -> StoreResult<User>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
}

/// Every lookup and mutation filters by note id and owner in one query.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn insert(&self, owner_id: Uuid, title: &str, content: &str) -> StoreResult<Note>;
    /// Newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Note>>;
    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Note>>;
    async fn update_owned(
        &self,
        owner_id: Uuid,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> StoreResult<Option<Note>>;
    /// Returns whether a row was removed.
    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> StoreResult<bool>;
}

pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<sqlx::PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./src/db/migrations").run(&pool).await?;
    tracing::info!("database migrations complete");

    Ok(pool)
}
