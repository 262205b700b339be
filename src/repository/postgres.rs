use async_trait::async_trait;
use tokio_postgres::{Client, NoTls, Row};
use uuid::Uuid;

use super::{NoteRepository, RepositoryError, UserDirectory, embedded::migrations};
use crate::models::{NewNote, Note, NotePatch, UserId};

pub struct PgRepository {
    client: Client,
}

impl PgRepository {
    pub async fn new(database_dsn: &str) -> Result<Self, tokio_postgres::Error> {
        let (client, con) = tokio_postgres::connect(database_dsn, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = con.await {
                tracing::error!("connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    pub async fn migrate(&mut self) -> Result<(), refinery::Error> {
        let migrations_report = migrations::runner().run_async(&mut self.client).await?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }
}

fn note_from_row(row: &Row) -> Note {
    Note {
        id: row.get("id"),
        owner: UserId::new(row.get("user_id")),
        title: row.get("title"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl NoteRepository for PgRepository {
    async fn create_note(&self, note: NewNote) -> Result<Note, RepositoryError> {
        let row = self
            .client
            .query_one(
                "INSERT INTO notes (id, user_id, title, content) VALUES ($1, $2, $3, $4) \
                 RETURNING id, user_id, title, content, created_at, updated_at",
                &[&note.id, note.owner.as_uuid(), &note.title, &note.content],
            )
            .await?;

        Ok(note_from_row(&row))
    }

    async fn get_one_note(&self, id: Uuid) -> Result<Option<Note>, RepositoryError> {
        let row = self
            .client
            .query_opt(
                "SELECT id, user_id, title, content, created_at, updated_at FROM notes WHERE id = $1",
                &[&id],
            )
            .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    async fn get_notes_by_owner(&self, owner: &UserId) -> Result<Vec<Note>, RepositoryError> {
        let rows = self
            .client
            .query(
                "SELECT id, user_id, title, content, created_at, updated_at FROM notes \
                 WHERE user_id = $1 ORDER BY created_at, id",
                &[owner.as_uuid()],
            )
            .await?;

        Ok(rows.iter().map(note_from_row).collect())
    }

    async fn update_note(
        &self,
        id: Uuid,
        patch: &NotePatch,
    ) -> Result<Option<Note>, RepositoryError> {
        let row = self
            .client
            .query_opt(
                "UPDATE notes SET title = COALESCE($2, title), \
                 content = COALESCE($3, content), updated_at = now() \
                 WHERE id = $1 RETURNING id, user_id, title, content, created_at, updated_at",
                &[&id, &patch.title, &patch.content],
            )
            .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    async fn delete_note(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let rows = self
            .client
            .execute("DELETE FROM notes WHERE id = $1", &[&id])
            .await?;

        Ok(rows == 1)
    }
}

#[async_trait]
impl UserDirectory for PgRepository {
    async fn user_exists(&self, id: &UserId) -> Result<bool, RepositoryError> {
        let row = self
            .client
            .query_opt("SELECT 1 FROM users WHERE id = $1", &[id.as_uuid()])
            .await?;

        Ok(row.is_some())
    }
}
