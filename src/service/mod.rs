use uuid::Uuid;

use std::sync::Arc;

use crate::{
    dto::{CreateNoteRequest, UpdateNoteRequest},
    models::{NewNote, Note, NotePatch, UserId},
    repository::{NoteRepository, RepositoryError},
};

#[derive(Debug, thiserror::Error)]
pub enum NoteServiceError {
    #[error("Please add all fields")]
    MissingFields,

    #[error("Field '{0}' cannot be empty")]
    EmptyField(&'static str),

    #[error("Note not found")]
    NotFound,

    #[error("Not authorized")]
    NotAuthorized,

    #[error("storage failure")]
    Storage(#[from] RepositoryError),
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

#[derive(Clone)]
pub struct NoteService {
    repo: Arc<dyn NoteRepository>,
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_notes(&self, owner: &UserId) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.get_notes_by_owner(owner).await?)
    }

    pub async fn create_note(
        &self,
        owner: UserId,
        request: CreateNoteRequest,
    ) -> Result<Note, NoteServiceError> {
        let (Some(title), Some(content)) = (required(request.title), required(request.content))
        else {
            return Err(NoteServiceError::MissingFields);
        };

        let note = self
            .repo
            .create_note(NewNote {
                id: Uuid::new_v4(),
                owner,
                title,
                content,
            })
            .await?;

        tracing::info!("user {} created note {}", owner, note.id);

        Ok(note)
    }

    /// Looks the note up, then checks it belongs to `owner`. A missing note
    /// is reported before any ownership decision is made.
    pub async fn owned_note(&self, owner: &UserId, id: Uuid) -> Result<Note, NoteServiceError> {
        let note = self
            .repo
            .get_one_note(id)
            .await?
            .ok_or(NoteServiceError::NotFound)?;

        if !note.is_owned_by(owner) {
            tracing::warn!("user {} attempted to access note {} of {}", owner, id, note.owner);
            return Err(NoteServiceError::NotAuthorized);
        }

        Ok(note)
    }

    /// Merges the supplied fields into a note already checked by
    /// [`Self::owned_note`].
    pub async fn apply_update(
        &self,
        note: Note,
        request: UpdateNoteRequest,
    ) -> Result<Note, NoteServiceError> {
        let patch = NotePatch::from(request);

        if patch.title.as_deref() == Some("") {
            return Err(NoteServiceError::EmptyField("title"));
        }
        if patch.content.as_deref() == Some("") {
            return Err(NoteServiceError::EmptyField("content"));
        }

        let updated = self
            .repo
            .update_note(note.id, &patch)
            .await?
            .ok_or(NoteServiceError::NotFound)?;

        tracing::info!("user {} updated note {}", updated.owner, updated.id);

        Ok(updated)
    }

    pub async fn delete_note(&self, owner: &UserId, id: Uuid) -> Result<(), NoteServiceError> {
        let note = self.owned_note(owner, id).await?;

        if !self.repo.delete_note(note.id).await? {
            return Err(NoteServiceError::NotFound);
        }

        tracing::info!("user {} deleted note {}", owner, id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::repository::MemoryRepository;

    fn setup() -> (NoteService, Arc<MemoryRepository>) {
        let repo = Arc::new(MemoryRepository::new());
        (NoteService::new(repo.clone()), repo)
    }

    fn user() -> UserId {
        UserId::new(Uuid::new_v4())
    }

    fn create(title: &str, content: &str) -> CreateNoteRequest {
        CreateNoteRequest {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
        }
    }

    /// Same order as the update route: lookup and ownership, then the body.
    async fn update(
        service: &NoteService,
        owner: &UserId,
        id: Uuid,
        request: UpdateNoteRequest,
    ) -> Result<Note, NoteServiceError> {
        let note = service.owned_note(owner, id).await?;
        service.apply_update(note, request).await
    }

    fn content_only(content: &str) -> UpdateNoteRequest {
        UpdateNoteRequest {
            title: None,
            content: Some(content.to_string()),
        }
    }

    #[tokio::test]
    async fn created_note_is_listed_for_owner_only() {
        let (service, _) = setup();
        let (alice, bob) = (user(), user());

        let note = service
            .create_note(alice, create("Groceries", "Milk"))
            .await
            .unwrap();

        let listed = service.list_notes(&alice).await.unwrap();
        assert_eq!(listed, vec![note.clone()]);
        assert_eq!(listed[0].owner, alice);
        assert!(service.list_notes(&bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_requires_both_fields() {
        let (service, repo) = setup();
        let alice = user();

        let requests = [
            CreateNoteRequest::default(),
            CreateNoteRequest {
                title: Some("Groceries".to_string()),
                content: None,
            },
            CreateNoteRequest {
                title: None,
                content: Some("Milk".to_string()),
            },
            create("", "Milk"),
            create("Groceries", ""),
        ];

        for request in requests {
            let result = service.create_note(alice, request.clone()).await;
            assert!(
                matches!(result, Err(NoteServiceError::MissingFields)),
                "{request:?}"
            );
        }

        assert_eq!(repo.note_count().await, 0);
    }

    #[tokio::test]
    async fn non_owner_is_refused_whatever_the_body() {
        let (service, _) = setup();
        let (alice, bob) = (user(), user());
        let note = service
            .create_note(alice, create("Groceries", "Milk"))
            .await
            .unwrap();

        for request in [content_only("Eggs"), content_only(""), UpdateNoteRequest::default()] {
            let result = update(&service, &bob, note.id, request).await;
            assert!(matches!(result, Err(NoteServiceError::NotAuthorized)));
        }

        let result = service.delete_note(&bob, note.id).await;
        assert!(matches!(result, Err(NoteServiceError::NotAuthorized)));

        let stored = service.owned_note(&alice, note.id).await.unwrap();
        assert_eq!(stored.content, "Milk");
    }

    #[tokio::test]
    async fn missing_note_wins_over_ownership() {
        let (service, _) = setup();
        let bob = user();
        let missing = Uuid::new_v4();

        let result = update(&service, &bob, missing, content_only("Eggs")).await;
        assert!(matches!(result, Err(NoteServiceError::NotFound)));

        let result = service.delete_note(&bob, missing).await;
        assert!(matches!(result, Err(NoteServiceError::NotFound)));
    }

    #[tokio::test]
    async fn partial_update_keeps_other_field_and_is_repeatable() {
        let (service, _) = setup();
        let alice = user();
        let note = service
            .create_note(alice, create("Groceries", "Milk"))
            .await
            .unwrap();

        let first = update(&service, &alice, note.id, content_only("Eggs"))
            .await
            .unwrap();
        let second = update(&service, &alice, note.id, content_only("Eggs"))
            .await
            .unwrap();

        assert_eq!(first.title, "Groceries");
        assert_eq!(first.content, "Eggs");
        assert_eq!(
            (&second.title, &second.content),
            (&first.title, &first.content)
        );
        assert_eq!(second.id, note.id);
        assert_eq!(second.owner, alice);
    }

    #[tokio::test]
    async fn owner_cannot_blank_a_field() {
        let (service, _) = setup();
        let alice = user();
        let note = service
            .create_note(alice, create("Groceries", "Milk"))
            .await
            .unwrap();

        let result = update(
            &service,
            &alice,
            note.id,
            UpdateNoteRequest {
                title: Some(String::new()),
                content: None,
            },
        )
        .await;

        assert!(matches!(result, Err(NoteServiceError::EmptyField("title"))));
        let stored = service.owned_note(&alice, note.id).await.unwrap();
        assert_eq!(stored.title, "Groceries");
    }

    #[tokio::test]
    async fn second_delete_reports_not_found() {
        let (service, repo) = setup();
        let alice = user();
        let note = service
            .create_note(alice, create("Groceries", "Milk"))
            .await
            .unwrap();

        service.delete_note(&alice, note.id).await.unwrap();
        assert_eq!(repo.note_count().await, 0);

        let result = service.delete_note(&alice, note.id).await;
        assert!(matches!(result, Err(NoteServiceError::NotFound)));
    }
}
