use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use mabot_storage::{validate_session, User};

use crate::error::AppError;
use crate::state::AppState;

/// The authenticated user behind a `Authorization: Bearer <token>` header.
/// Missing, malformed, expired and unknown tokens all reject the same way.
pub struct AuthUser(pub User);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let user = validate_session(&state.db, state.secret(), token)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(AuthUser(user))
    }
}
