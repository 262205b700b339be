use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use std::collections::HashSet;

use super::{NoteRepository, RepositoryError, UserDirectory};
use crate::models::{NewNote, Note, NotePatch, UserId};

/// In-process store for tests and local runs. Notes keep insertion order.
#[derive(Default)]
pub struct MemoryRepository {
    notes: RwLock<Vec<Note>>,
    users: RwLock<HashSet<UserId>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, id: UserId) {
        self.users.write().await.insert(id);
    }

    pub async fn remove_user(&self, id: &UserId) {
        self.users.write().await.remove(id);
        self.notes.write().await.retain(|note| note.owner != *id);
    }

    pub async fn note_count(&self) -> usize {
        self.notes.read().await.len()
    }
}

#[async_trait]
impl NoteRepository for MemoryRepository {
    async fn create_note(&self, note: NewNote) -> Result<Note, RepositoryError> {
        let now = Utc::now();
        let note = Note {
            id: note.id,
            owner: note.owner,
            title: note.title,
            content: note.content,
            created_at: now,
            updated_at: now,
        };

        self.notes.write().await.push(note.clone());

        Ok(note)
    }

    async fn get_one_note(&self, id: Uuid) -> Result<Option<Note>, RepositoryError> {
        Ok(self
            .notes
            .read()
            .await
            .iter()
            .find(|note| note.id == id)
            .cloned())
    }

    async fn get_notes_by_owner(&self, owner: &UserId) -> Result<Vec<Note>, RepositoryError> {
        Ok(self
            .notes
            .read()
            .await
            .iter()
            .filter(|note| note.owner == *owner)
            .cloned()
            .collect())
    }

    async fn update_note(
        &self,
        id: Uuid,
        patch: &NotePatch,
    ) -> Result<Option<Note>, RepositoryError> {
        let mut notes = self.notes.write().await;

        Ok(notes.iter_mut().find(|note| note.id == id).map(|note| {
            patch.apply_to(note);
            note.updated_at = Utc::now();
            note.clone()
        }))
    }

    async fn delete_note(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|note| note.id != id);

        Ok(notes.len() != before)
    }
}

#[async_trait]
impl UserDirectory for MemoryRepository {
    async fn user_exists(&self, id: &UserId) -> Result<bool, RepositoryError> {
        Ok(self.users.read().await.contains(id))
    }
}
