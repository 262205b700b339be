#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use std::sync::Arc;

use notes_api::{
    AppState,
    auth::Claims,
    config::Environment,
    models::{NewNote, Note, NotePatch, UserId},
    repository::{MemoryRepository, NoteRepository, RepositoryError, UserDirectory},
    router,
};

pub const SECRET: &str = "integration_test_secret";

pub struct TestApp {
    pub app: Router,
    pub repo: Arc<MemoryRepository>,
}

pub struct TestUser {
    pub id: UserId,
    pub token: String,
}

pub fn sign_token(id: UserId, secret: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        id,
        exp: now + 30 * 24 * 3600,
        iat: Some(now),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token should encode")
}

/// A store whose every call fails, as if the database were down.
pub struct BrokenStore;

fn outage() -> RepositoryError {
    RepositoryError::Unavailable("connection refused by 10.0.0.5:5432".to_string())
}

#[async_trait]
impl NoteRepository for BrokenStore {
    async fn create_note(&self, _note: NewNote) -> Result<Note, RepositoryError> {
        Err(outage())
    }

    async fn get_one_note(&self, _id: Uuid) -> Result<Option<Note>, RepositoryError> {
        Err(outage())
    }

    async fn get_notes_by_owner(&self, _owner: &UserId) -> Result<Vec<Note>, RepositoryError> {
        Err(outage())
    }

    async fn update_note(
        &self,
        _id: Uuid,
        _patch: &NotePatch,
    ) -> Result<Option<Note>, RepositoryError> {
        Err(outage())
    }

    async fn delete_note(&self, _id: Uuid) -> Result<bool, RepositoryError> {
        Err(outage())
    }
}

#[async_trait]
impl UserDirectory for BrokenStore {
    async fn user_exists(&self, _id: &UserId) -> Result<bool, RepositoryError> {
        Err(outage())
    }
}

impl TestApp {
    pub fn new(environment: Environment) -> Self {
        let repo = Arc::new(MemoryRepository::new());
        Self::with_stores(repo.clone(), repo.clone(), repo, environment)
    }

    /// Users resolve normally, every note operation fails.
    pub fn with_broken_notes(environment: Environment) -> Self {
        let repo = Arc::new(MemoryRepository::new());
        Self::with_stores(repo.clone(), Arc::new(BrokenStore), repo, environment)
    }

    /// The user lookup behind the bearer guard fails.
    pub fn with_broken_users(environment: Environment) -> Self {
        let repo = Arc::new(MemoryRepository::new());
        Self::with_stores(repo.clone(), repo, Arc::new(BrokenStore), environment)
    }

    fn with_stores(
        repo: Arc<MemoryRepository>,
        notes: Arc<dyn NoteRepository>,
        users: Arc<dyn UserDirectory>,
        environment: Environment,
    ) -> Self {
        let state = AppState::new(notes, users, SECRET, environment);

        Self {
            app: router(state),
            repo,
        }
    }

    pub async fn user(&self) -> TestUser {
        let id = UserId::new(Uuid::new_v4());
        self.repo.add_user(id).await;

        TestUser {
            id,
            token: sign_token(id, SECRET),
        }
    }

    /// Sends a request and returns the status with the body parsed as JSON,
    /// or as a JSON string when it is not JSON.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let body = match body {
            Some(body) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(request.body(body).expect("request should build"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");

        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, value)
    }

    pub async fn create_note(&self, user: &TestUser, title: &str, content: &str) -> Value {
        let body = serde_json::json!({ "title": title, "content": content }).to_string();
        let (status, note) = self
            .call(Method::POST, "/api/notes", Some(&user.token), Some(&body))
            .await;

        assert_eq!(status, StatusCode::CREATED, "{note}");
        note
    }
}
