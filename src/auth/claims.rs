use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::repo_types::UserId;

/// JWT payload carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,   // user ID
    pub name: String,  // display name
    pub email: String, // login email
    pub iat: usize,    // issued at (unix timestamp)
    pub exp: usize,    // expires at (unix timestamp)
    pub iss: String,   // issuer
    pub aud: String,   // audience
}

/// Identity of the caller, recovered from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}

impl From<Claims> for Session {
    fn from(c: Claims) -> Self {
        Self {
            user_id: c.sub,
            name: c.name,
            email: c.email,
        }
    }
}

/// A freshly signed token together with the session it encodes.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: OffsetDateTime,
    pub session: Session,
}
