use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use mabot_core::extract_spreadsheet_id;
use mabot_storage::{add_spreadsheet, delete_spreadsheet, get_user_spreadsheets, UserSpreadsheet};

use crate::error::AppError;
use crate::session::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddSpreadsheetRequest {
    /// A full Google Sheets URL or a bare spreadsheet id.
    pub spreadsheet: String,
    #[serde(default)]
    pub name: String,
}

pub async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserSpreadsheet>>, AppError> {
    Ok(Json(get_user_spreadsheets(&state.db, user.id).await?))
}

pub async fn add(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddSpreadsheetRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let id = extract_spreadsheet_id(&req.spreadsheet)
        .ok_or_else(|| AppError::BadRequest("not a spreadsheet URL or id".into()))?;
    let name = if req.name.trim().is_empty() { id.clone() } else { req.name.trim().to_string() };

    add_spreadsheet(&state.db, user.id, &id, &name).await?;
    info!(user_id = user.id, spreadsheet_id = %id, "spreadsheet linked");
    Ok((StatusCode::CREATED, Json(json!({ "spreadsheet_id": id, "name": name }))))
}

pub async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if delete_spreadsheet(&state.db, user.id, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("spreadsheet not linked"))
    }
}
