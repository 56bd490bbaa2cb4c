use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::claims::Session;
use crate::error::AppError;
use crate::state::AppState;

/// Response header carrying a renewed session token.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth = headers.get(AUTHORIZATION)?.to_str().ok()?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
}

/// Yields the caller's session: the one `renew_session` already validated,
/// or else a fresh validation of the bearer token.
pub struct AuthSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(AuthSession(session.clone()));
        }
        let Some(token) = bearer_token(&parts.headers) else {
            warn!("missing or malformed Authorization header");
            return Err(AppError::unauthenticated("you need to sign in"));
        };
        let session = state.auth.validate(token)?;
        Ok(AuthSession(session))
    }
}

/// Route layer: a successful authenticated request gets a fresh token back.
pub async fn renew_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = bearer_token(req.headers()).and_then(|t| state.auth.validate(t).ok());
    if let Some(session) = &session {
        req.extensions_mut().insert(session.clone());
    }
    let mut res = next.run(req).await;

    if let Some(session) = session {
        if res.status().is_success() {
            match state.auth.renew(session) {
                Ok(issued) => {
                    if let Ok(value) = HeaderValue::from_str(&issued.token) {
                        res.headers_mut().insert(SESSION_TOKEN_HEADER, value);
                    }
                }
                Err(e) => warn!(error = %e, "session renewal failed"),
            }
        }
    }
    res
}
