mod embedded;
mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{NewNote, Note, NotePatch, UserId};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error")]
    Database(#[from] tokio_postgres::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Note storage. Each call is atomic for the single note it touches.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn create_note(&self, note: NewNote) -> Result<Note, RepositoryError>;

    async fn get_one_note(&self, id: Uuid) -> Result<Option<Note>, RepositoryError>;

    async fn get_notes_by_owner(&self, owner: &UserId) -> Result<Vec<Note>, RepositoryError>;

    /// Merges `patch` into the note and returns the new version, or `None`
    /// if no note has this id.
    async fn update_note(
        &self,
        id: Uuid,
        patch: &NotePatch,
    ) -> Result<Option<Note>, RepositoryError>;

    /// Returns `false` if no note has this id.
    async fn delete_note(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

/// Read-only view of the identity store.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, id: &UserId) -> Result<bool, RepositoryError>;
}
