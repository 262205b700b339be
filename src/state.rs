use std::sync::Arc;

use crate::{
    auth::TokenVerifier,
    config::Environment,
    repository::{NoteRepository, UserDirectory},
    service::NoteService,
};

#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<NoteService>,
    pub users: Arc<dyn UserDirectory>,
    pub tokens: Arc<TokenVerifier>,
    pub environment: Environment,
}

impl AppState {
    pub fn new(
        notes: Arc<dyn NoteRepository>,
        users: Arc<dyn UserDirectory>,
        jwt_secret: &str,
        environment: Environment,
    ) -> Self {
        Self {
            notes: Arc::new(NoteService::new(notes)),
            users,
            tokens: Arc::new(TokenVerifier::new(jwt_secret)),
            environment,
        }
    }
}
