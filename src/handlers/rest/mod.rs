use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    dto::{CreateNoteRequest, ErrorResponse, MessageResponse, NoteResponse, UpdateNoteRequest},
    error::AppError,
    service::NoteServiceError,
    state::AppState,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notes API",
        description = "API documentation for the Notes application"
    ),
    paths(get_notes, create_note, update_note, delete_note),
    components(schemas(
        NoteResponse,
        CreateNoteRequest,
        UpdateNoteRequest,
        MessageResponse,
        ErrorResponse
    )),
    modifiers(&SecurityAddon),
    security(("bearerAuth" = [])),
    tags(
        (name = "notes", description = "Endpoints for managing user notes")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Ids that are not UUIDs cannot name a stored note.
fn parse_note_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::from(NoteServiceError::NotFound))
}

pub async fn root() -> Response {
    (StatusCode::OK, "Notes API is running...").into_response()
}

#[utoipa::path(
    get,
    path = "/api/notes",
    responses(
        (status = 200, description = "Successfully fetched all notes", body = Vec<NoteResponse>),
        (status = 401, description = "Unauthorized - Token missing or invalid", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_notes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<NoteResponse>>, AppError> {
    let notes = state.notes.list_notes(&user.id).await?;

    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = NoteResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteResponse>), AppError> {
    let Json(request) = payload?;
    let note = state.notes.create_note(user.id, request).await?;

    Ok((StatusCode::CREATED, Json(note.into())))
}

#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated successfully", body = NoteResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Note not found", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<Json<NoteResponse>, AppError> {
    let id = parse_note_id(&id)?;
    let note = state.notes.owned_note(&user.id, id).await?;

    // The body is only judged once the caller is known to own the note.
    // A request without a JSON body changes nothing.
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => UpdateNoteRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };
    let note = state.notes.apply_update(note, request).await?;

    Ok(Json(note.into()))
}

#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note deleted successfully", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Note not found", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_note_id(&id)?;
    state.notes.delete_note(&user.id, id).await?;

    Ok(Json(MessageResponse {
        message: "Note deleted".to_string(),
    }))
}
