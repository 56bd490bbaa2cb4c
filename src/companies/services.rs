use std::sync::Arc;

use crate::auth::claims::Session;
use crate::error::AppError;
use crate::tasks::{
    repo::TaskStore,
    repo_types::{CompanyStat, Task},
};

/// Read-side statistics over a user's visits, keyed by exact company name.
pub struct CompanyService {
    store: Arc<dyn TaskStore>,
}

impl CompanyService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn summary(&self, session: &Session) -> Result<Vec<CompanyStat>, AppError> {
        Ok(self.store.company_summary(session.user_id).await?)
    }

    pub async fn visits(&self, session: &Session, company_name: &str) -> Result<Vec<Task>, AppError> {
        Ok(self.store.by_company(session.user_id, company_name).await?)
    }
}
