use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use mabot_sheets::SheetsError;
use mabot_storage::StorageError;

/// Errors a handler can surface to the client. Auth failures stay generic so
/// the response never reveals which field was wrong.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid username or password")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("username or email already exists")]
    Conflict,
    #[error(transparent)]
    Sheets(#[from] SheetsError),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::DuplicateUser => AppError::Conflict,
            other => AppError::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, (*what).to_string()),
            AppError::Conflict => (StatusCode::CONFLICT, self.to_string()),
            AppError::Sheets(e) => {
                tracing::warn!(error = %e, "sheets call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Gagal mengakses Google Sheets. Silakan coba lagi.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_user_maps_to_conflict() {
        let err: AppError = StorageError::DuplicateUser.into();
        assert!(matches!(err, AppError::Conflict));
    }

    #[test]
    fn sheets_error_becomes_bad_gateway() {
        let response = AppError::Sheets(SheetsError::RowOutOfRange(1)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unauthorized_message_is_generic() {
        assert_eq!(AppError::Unauthorized.to_string(), "invalid username or password");
    }
}
