use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use mabot_storage::{authenticate_user, create_session, create_user, delete_session, User};

use crate::error::AppError;
use crate::session::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: User,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let username = req.username.trim();
    let email = req.email.trim();
    if username.is_empty() || email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("username and a valid email are required".into()));
    }
    if req.password.len() < 6 {
        return Err(AppError::BadRequest("password must be at least 6 characters".into()));
    }
    if req.password != req.confirm {
        return Err(AppError::BadRequest("passwords do not match".into()));
    }

    let user = create_user(&state.db, username, email, &req.password).await?;
    info!(username, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// `username` also accepts the account email. Any failure, wrong password or
/// unknown account alike, answers with the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = authenticate_user(&state.db, req.username.trim(), &req.password)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let session = create_session(&state.db, state.secret(), user.id, req.remember_me).await?;
    info!(username = %user.username, remember_me = req.remember_me, "login");
    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        user,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;
    delete_session(&state.db, state.secret(), token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}
