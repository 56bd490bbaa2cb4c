use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    auth::extractors::AuthSession, error::AppError, state::AppState, tasks::repo_types::Task,
};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub tasks: Vec<Task>,
}

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/tasks/search", get(search_tasks))
}

#[instrument(skip(state, session, query))]
pub async fn search_tasks(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Query(query) = query?;
    let tasks = state.search.search(&session, &query.q).await?;
    Ok(Json(SearchResponse { tasks }))
}
