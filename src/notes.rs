use std::sync::Arc;

use uuid::Uuid;

use crate::db::NoteRepository;
use crate::error::{Error, Result};
use crate::models::note::Note;

/// Owner-scoped note operations. `owner_id` always comes from the
/// authenticated identity, and a note owned by someone else is reported
/// exactly like a missing one.
#[derive(Clone)]
pub struct NoteStore {
    notes: Arc<dyn NoteRepository>,
}

impl NoteStore {
    pub fn new(notes: Arc<dyn NoteRepository>) -> Self {
        Self { notes }
    }

    pub async fn create(&self, owner_id: Uuid, title: &str, content: &str) -> Result<Note> {
        validate_title(title)?;
        let note = self.notes.insert(owner_id, title, content).await?;
        tracing::info!(user_id = %owner_id, note_id = %note.id, "note created");
        Ok(note)
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Note>> {
        let notes = self.notes.list_by_owner(owner_id).await?;
        tracing::debug!(user_id = %owner_id, count = notes.len(), "notes listed");
        Ok(notes)
    }

    pub async fn get_one(&self, owner_id: Uuid, note_id: Uuid) -> Result<Note> {
        self.notes
            .find_owned(owner_id, note_id)
            .await?
            .ok_or(Error::NotFound)
    }

    pub async fn update(
        &self,
        owner_id: Uuid,
        note_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Note> {
        validate_title(title)?;
        let note = self
            .notes
            .update_owned(owner_id, note_id, title, content)
            .await?
            .ok_or_else(|| {
                tracing::warn!(
                    user_id = %owner_id,
                    note_id = %note_id,
                    "note not found for update"
                );
                Error::NotFound
            })?;
        tracing::info!(user_id = %owner_id, note_id = %note_id, "note updated");
        Ok(note)
    }

    /// Deleting an already deleted note is `NotFound`, not a silent success.
    pub async fn delete(&self, owner_id: Uuid, note_id: Uuid) -> Result<()> {
        if !self.notes.delete_owned(owner_id, note_id).await? {
            tracing::warn!(user_id = %owner_id, note_id = %note_id, "note not found for deletion");
            return Err(Error::NotFound);
        }
        tracing::info!(user_id = %owner_id, note_id = %note_id, "note deleted");
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation("Title is required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    fn store() -> NoteStore {
        NoteStore::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn create_requires_a_title() {
        let notes = store();
        let owner = Uuid::new_v4();

        for title in ["", "   ", "\n\t"] {
            assert!(matches!(
                notes.create(owner, title, "body").await,
                Err(Error::Validation(_))
            ));
        }

        let note = notes.create(owner, "Groceries", "").await.unwrap();
        assert_eq!(note.owner_id, owner);
        assert_eq!(note.content, "");
        assert_eq!(note.created_at, note.updated_at);
    }

    #[tokio::test]
    async fn owners_are_isolated() {
        let notes = store();
        let (ann, bob) = (Uuid::new_v4(), Uuid::new_v4());

        let ann_note = notes.create(ann, "Ann's", "a").await.unwrap();
        let bob_note = notes.create(bob, "Bob's", "b").await.unwrap();

        let listed = notes.list_by_owner(ann).await.unwrap();
        assert_eq!(listed, vec![ann_note.clone()]);
        assert!(listed.iter().all(|n| n.owner_id == ann));

        assert!(matches!(
            notes.get_one(ann, bob_note.id).await,
            Err(Error::NotFound)
        ));
        assert_eq!(notes.get_one(bob, bob_note.id).await.unwrap(), bob_note);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let notes = store();
        let owner = Uuid::new_v4();
        let first = notes.create(owner, "first", "").await.unwrap();
        let second = notes.create(owner, "second", "").await.unwrap();
        let third = notes.create(owner, "third", "").await.unwrap();

        let ids: Vec<Uuid> = notes
            .list_by_owner(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_refreshes_timestamp() {
        let notes = store();
        let owner = Uuid::new_v4();
        let note = notes.create(owner, "Draft", "v1").await.unwrap();

        let updated = notes.update(owner, note.id, "Final", "v2").await.unwrap();
        assert_eq!(updated.id, note.id);
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.content, "v2");
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at >= note.updated_at);

        assert!(matches!(
            notes.update(owner, note.id, " ", "v3").await,
            Err(Error::Validation(_))
        ));
        assert_eq!(notes.get_one(owner, note.id).await.unwrap().title, "Final");
    }

    #[tokio::test]
    async fn update_and_delete_unify_missing_and_foreign() {
        let notes = store();
        let (ann, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let bob_note = notes.create(bob, "Bob's", "b").await.unwrap();

        for id in [Uuid::new_v4(), bob_note.id] {
            assert!(matches!(
                notes.update(ann, id, "x", "y").await,
                Err(Error::NotFound)
            ));
            assert!(matches!(notes.delete(ann, id).await, Err(Error::NotFound)));
        }

        let untouched = notes.get_one(bob, bob_note.id).await.unwrap();
        assert_eq!(untouched.title, "Bob's");
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let notes = store();
        let owner = Uuid::new_v4();
        let note = notes.create(owner, "Groceries", "milk,eggs").await.unwrap();

        notes.delete(owner, note.id).await.unwrap();
        assert!(matches!(
            notes.delete(owner, note.id).await,
            Err(Error::NotFound)
        ));
        assert!(notes.list_by_owner(owner).await.unwrap().is_empty());
    }
}
