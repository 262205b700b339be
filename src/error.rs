use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use std::error::Error as _;

use crate::{auth::AuthError, dto::ErrorResponse, service::NoteServiceError};

/// Client-visible error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    Validation,
    NotFound,
    Forbidden,
    Internal,
}

impl ErrorKind {
    /// Ownership mismatches answer 401, as existing clients of this API expect.
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::Forbidden => StatusCode::UNAUTHORIZED,
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Note(#[from] NoteServiceError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Not Found - {0}")]
    RouteNotFound(String),

    #[error("handler panicked: {0}")]
    Panic(String),
}

impl AppError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(AuthError::Directory(_))
            | Self::Note(NoteServiceError::Storage(_))
            | Self::Panic(_) => ErrorKind::Internal,
            Self::Auth(_) => ErrorKind::Unauthenticated,
            Self::Note(NoteServiceError::MissingFields | NoteServiceError::EmptyField(_))
            | Self::InvalidBody(_) => ErrorKind::Validation,
            Self::Note(NoteServiceError::NotFound) | Self::RouteNotFound(_) => ErrorKind::NotFound,
            Self::Note(NoteServiceError::NotAuthorized) => ErrorKind::Forbidden,
        }
    }

    /// Message sent to the client. Internal failures are not described.
    pub fn message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "Internal Server Error".to_string(),
            _ => self.to_string(),
        }
    }

    /// The error followed by its chain of causes.
    pub fn stack(&self) -> String {
        std::iter::successors(self.source(), |&cause| cause.source()).fold(
            format!("{:?}: {self}", self.kind()),
            |mut stack, cause| {
                stack.push_str("\n    caused by: ");
                stack.push_str(&cause.to_string());
                stack
            },
        )
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

/// Attached to error responses so the boundary normalizer can decide how
/// much detail to expose.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
    pub stack: String,
}

pub fn error_response(status: StatusCode, message: String, stack: Option<String>) -> Response {
    (status, Json(ErrorResponse { message, stack })).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.kind().status();
        let report = ErrorReport {
            message: self.message(),
            stack: self.stack(),
        };

        if status.is_server_error() {
            tracing::error!("request failed with {}: {}", status, report.stack);
        } else {
            tracing::warn!("request rejected with {}: {}", status, self);
        }

        let mut response = error_response(status, report.message.clone(), None);
        response.extensions_mut().insert(report);
        response
    }
}
