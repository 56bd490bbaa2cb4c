use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::{
    claims::{IssuedSession, Session},
    jwt::SessionKeys,
    password::{hash_password_blocking, verify_password_blocking},
    repo::UserStore,
    repo_types::{NewUser, User},
};
use crate::error::AppError;

const MIN_PASSWORD_LEN: usize = 8;
const MIN_PASSWORD_DIGITS: usize = 2;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Length is checked before digit count.
pub(crate) fn check_password_shape(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(
            "password must be at least 8 characters",
        ));
    }
    let digits = password.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < MIN_PASSWORD_DIGITS {
        return Err(AppError::validation("password must contain at least 2 digits"));
    }
    Ok(())
}

/// Registration input as received from the client.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Verifies credentials, issues session tokens and validates them on each request.
pub struct Authenticator {
    users: Arc<dyn UserStore>,
    keys: SessionKeys,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserStore>, keys: SessionKeys) -> Self {
        Self { users, keys }
    }

    pub async fn register(&self, input: Registration) -> Result<User, AppError> {
        let first_name = input.first_name.trim();
        let last_name = input.last_name.trim();
        let email = input.email.trim().to_lowercase();

        if first_name.is_empty() || last_name.is_empty() || email.is_empty() || input.password.is_empty()
        {
            return Err(AppError::validation("all fields are required"));
        }
        check_password_shape(&input.password)?;
        if !is_valid_email(&email) {
            warn!(email = %email, "invalid email");
            return Err(AppError::validation("please enter a valid email address"));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(email_taken());
        }

        let password_hash = hash_password_blocking(input.password).await?;
        let new_user = NewUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email,
            password_hash,
        };

        // a concurrent registration may win between the lookup and the insert
        let user = self.users.insert(&new_user).await?.ok_or_else(|| {
            warn!(email = %new_user.email, "email registered concurrently");
            email_taken()
        })?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<IssuedSession, AppError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::validation("email and password are required"));
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!(email = %email, "login unknown email");
            return Err(AppError::not_found("no account found for this email"));
        };

        if !verify_password_blocking(password.to_string(), user.password_hash.clone()).await? {
            warn!(email = %email, user_id = %user.id, "login invalid password");
            return Err(AppError::InvalidCredentials("incorrect password".into()));
        }

        let issued = self.keys.sign(Session {
            user_id: user.id,
            name: user.display_name(),
            email: user.email,
        })?;
        info!(user_id = %issued.session.user_id, "user logged in");
        Ok(issued)
    }

    pub fn validate(&self, token: &str) -> Result<Session, AppError> {
        let claims = self.keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::unauthenticated("invalid or expired session")
        })?;
        Ok(claims.into())
    }

    /// Mints a fresh token for a session that was already validated.
    pub fn renew(&self, session: Session) -> Result<IssuedSession, AppError> {
        Ok(self.keys.sign(session)?)
    }
}

fn email_taken() -> AppError {
    AppError::Conflict("this email address is already in use".into())
}
