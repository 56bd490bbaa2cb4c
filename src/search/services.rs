use std::sync::Arc;

use tracing::debug;

use crate::auth::claims::Session;
use crate::error::AppError;
use crate::tasks::{repo::TaskStore, repo_types::Task};

/// Shorter queries would scan nearly every task.
pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_RESULTS: i64 = 20;

pub struct SearchService {
    store: Arc<dyn TaskStore>,
}

impl SearchService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn search(&self, session: &Session, query: &str) -> Result<Vec<Task>, AppError> {
        if query.chars().count() < MIN_QUERY_CHARS {
            debug!(user_id = %session.user_id, "search query too short");
            return Ok(Vec::new());
        }
        Ok(self
            .store
            .search_company(session.user_id, query, MAX_RESULTS)
            .await?)
    }
}
