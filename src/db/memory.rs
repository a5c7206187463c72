use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NoteRepository, StoreResult, UserRepository};
use crate::error::StoreError;
use crate::models::note::Note;
use crate::models::user::{NewUser, User};

/// Process-local backend for tests and for running without `DATABASE_URL`.
///
/// Writes hold the lock across check-and-modify, which gives the same
/// per-row atomicity the Postgres backend gets from its constraints.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    // Insertion order is creation order.
    notes: Arc<RwLock<Vec<Note>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users with this email.
    pub async fn count_users_with_email(&self, email: &str) -> usize {
        self.users
            .read()
            .await
            .values()
            .filter(|u| u.email == email)
            .count()
    }

    /// Removes a user and, like the relational schema, all of their notes.
    pub async fn remove_user(&self, id: Uuid) -> bool {
        let removed = self.users.write().await.remove(&id).is_some();
        if removed {
            self.notes.write().await.retain(|n| n.owner_id != id);
        }
        removed
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation);
        }

        let stored = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl NoteRepository for MemoryStore {
    async fn insert(&self, owner_id: Uuid, title: &str, content: &str) -> StoreResult<Note> {
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.notes.write().await.push(note.clone());
        Ok(note)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Note>> {
        let mut owned: Vec<Note> = self
            .notes
            .read()
            .await
            .iter()
            .rev()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Note>> {
        Ok(self
            .notes
            .read()
            .await
            .iter()
            .find(|n| n.id == id && n.owner_id == owner_id)
            .cloned())
    }

    async fn update_owned(
        &self,
        owner_id: Uuid,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> StoreResult<Option<Note>> {
        let mut notes = self.notes.write().await;
        let Some(note) = notes
            .iter_mut()
            .find(|n| n.id == id && n.owner_id == owner_id)
        else {
            return Ok(None);
        };

        note.title = title.to_string();
        note.content = content.to_string();
        note.updated_at = Utc::now();
        Ok(Some(note.clone()))
    }

    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| !(n.id == id && n.owner_id == owner_id));
        Ok(notes.len() < before)
    }
}
