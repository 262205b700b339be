use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Note, NotePatch, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    /// Note ID
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Note title
    pub title: String,
    /// Note content
    pub content: String,
    /// ID of the owning user
    #[schema(value_type = String, format = Uuid)]
    pub user: UserId,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            user: note.owner,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// Both fields are required. They are optional here so that a missing field
/// is reported as a validation error instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    /// Note title
    #[schema(example = "Meeting Notes")]
    pub title: Option<String>,
    /// Note content
    #[schema(example = "Discuss project timeline and deliverables")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateNoteRequest {
    /// New note title
    #[schema(example = "Updated Grocery List")]
    pub title: Option<String>,
    /// New note content
    #[schema(example = "Buy eggs, milk, bread, and butter")]
    pub content: Option<String>,
}

impl From<UpdateNoteRequest> for NotePatch {
    fn from(request: UpdateNoteRequest) -> Self {
        Self {
            title: request.title,
            content: request.content,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Note deleted")]
    pub message: String,
}

/// Shape of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    /// Error cause chain, omitted in production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}
