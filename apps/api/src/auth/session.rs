use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// Extractor for routes that require an authenticated user. Reads the
/// `Authorization: Bearer <token>` header, validates the token, and loads the
/// user row so handlers always act on fresh role/ownership data.
pub struct CurrentUser(pub User);

/// Extractor for routes that work for anonymous visitors but personalize for
/// an authenticated one (e.g. the applied-marker on public job detail).
pub struct OptionalUser(pub Option<User>);

async fn load_user(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    let Some(token) = bearer_token(parts) else {
        return Ok(None);
    };
    let Ok(user_id) = state.tokens.verify(token) else {
        return Ok(None);
    };
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?;
    Ok(user)
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        match load_user(parts, state).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => Err(AppError::AuthenticationRequired),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        Ok(OptionalUser(load_user(parts, state).await?))
    }
}
