use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, repository::CommentRepository, services::comment::CommentService};

#[derive(Clone)]
pub struct AppState {
    pub comments: CommentService,
    pub config: Config,
}

impl AppState {
    pub fn new(repo: Arc<dyn CommentRepository>, config: Config) -> Self {
        Self {
            comments: CommentService::new(repo),
            config,
        }
    }
}

impl FromRef<AppState> for CommentService {
    fn from_ref(state: &AppState) -> Self {
        state.comments.clone()
    }
}
