use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::extractors::AuthSession,
    error::AppError,
    state::AppState,
    tasks::repo_types::{CompanyStat, Task},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompaniesResponse {
    pub companies: Vec<CompanyStat>,
    pub total_companies: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyVisitsResponse {
    pub company_name: String,
    pub visits: Vec<Task>,
    pub total_visits: usize,
}

pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies))
        .route("/companies/:name", get(company_visits))
}

#[instrument(skip(state, session))]
pub async fn list_companies(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<CompaniesResponse>, AppError> {
    let companies = state.companies.summary(&session).await?;
    Ok(Json(CompaniesResponse {
        total_companies: companies.len(),
        companies,
    }))
}

/// `name` arrives percent-decoded by the `Path` extractor.
#[instrument(skip(state, session, name))]
pub async fn company_visits(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    name: Result<Path<String>, PathRejection>,
) -> Result<Json<CompanyVisitsResponse>, AppError> {
    let Path(name) = name?;
    let visits = state.companies.visits(&session, &name).await?;
    Ok(Json(CompanyVisitsResponse {
        company_name: name,
        total_visits: visits.len(),
        visits,
    }))
}
