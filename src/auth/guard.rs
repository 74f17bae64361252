//! Authentication and ownership checks for mutating requests.
//!
//! `authenticate` turns an optional token into an identity; `authorize`
//! decides whether that identity may mutate a given survey. Handlers run
//! them in that order, with the survey lookup in between.

use crate::config::SecurityConfig;
use crate::database::models::Survey;
use crate::middleware::AuthUser;

use super::validate_jwt;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no token supplied")]
    MissingToken,
    #[error("token rejected: {0}")]
    InvalidToken(String),
    #[error("user '{user}' is not the author ('{author}')")]
    NotAuthor { user: String, author: String },
}

/// Verify a token and produce the identity it asserts.
pub fn authenticate(security: &SecurityConfig, token: Option<&str>) -> Result<AuthUser, AuthError> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let claims = validate_jwt(security, token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    Ok(AuthUser::from(claims))
}

/// Only the author may mutate a survey.
pub fn authorize(user: &AuthUser, survey: &Survey) -> Result<(), AuthError> {
    if user.username == survey.author {
        tracing::debug!("User '{}' authorized for survey {}", user.username, survey.id);
        Ok(())
    } else {
        Err(AuthError::NotAuthor {
            user: user.username.clone(),
            author: survey.author.clone(),
        })
    }
}
