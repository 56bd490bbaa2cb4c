use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, SessionResponse},
        extractors::{AuthSession, SESSION_TOKEN_HEADER},
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/session", get(current_session))
}

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let Json(payload) = body?;
    let user = state.auth.register(payload.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "registration successful",
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(payload) = body?;
    let issued = state
        .auth
        .authenticate(
            payload.email.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(issued.into()))
}

/// Returns the caller's identity along with a renewed token.
#[instrument(skip(state, session))]
pub async fn current_session(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<(HeaderMap, Json<SessionResponse>), AppError> {
    let issued = state.auth.renew(session)?;
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&issued.token) {
        headers.insert(SESSION_TOKEN_HEADER, value);
    }
    Ok((
        headers,
        Json(SessionResponse {
            user: issued.session.into(),
            expires_at: issued.expires_at,
        }),
    ))
}
