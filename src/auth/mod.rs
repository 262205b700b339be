use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::UserId, repository::RepositoryError, state::AppState};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Not authorized, no token")]
    NoToken,

    #[error("Not authorized, token failed")]
    TokenFailed(#[from] jsonwebtoken::errors::Error),

    #[error("Not authorized, user not found")]
    UserNotFound,

    #[error("failed to look up user")]
    Directory(#[source] RepositoryError),
}

/// Claims issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: UserId,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Caller identity, available to handlers as `Extension<AuthUser>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
}

pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(decode::<Claims>(token, &self.key, &self.validation)?.claims)
    }
}

pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::NoToken)?;

    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::NoToken),
    }
}

/// Rejects the request unless it carries a valid token for an existing user.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(request.headers())?;
    let claims = state.tokens.verify(token)?;

    let exists = state
        .users
        .user_exists(&claims.id)
        .await
        .map_err(AuthError::Directory)?;

    if !exists {
        tracing::warn!("token refers to unknown user {}", claims.id);
        return Err(AuthError::UserNotFound.into());
    }

    tracing::debug!("authenticated user {}", claims.id);
    request
        .extensions_mut()
        .insert(AuthUser { id: claims.id });

    Ok(next.run(request).await)
}
