use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

pub mod auth;
pub mod chat;
pub mod spreadsheets;
pub mod summary;
pub mod transactions;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/spreadsheets",
            get(spreadsheets::list).post(spreadsheets::add),
        )
        .route("/api/spreadsheets/{id}", delete(spreadsheets::remove))
        .route("/api/chat", post(chat::chat))
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/api/transactions/{row}",
            put(transactions::update).delete(transactions::remove),
        )
        .route("/api/summary", get(summary::summary))
        .fallback_service(ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Every sheet access goes through here; an unlinked spreadsheet looks the
/// same as a nonexistent one.
pub(crate) async fn ensure_owned(
    state: &AppState,
    user_id: i64,
    spreadsheet_id: &str,
) -> Result<(), AppError> {
    if mabot_storage::user_owns_spreadsheet(&state.db, user_id, spreadsheet_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("spreadsheet not linked"))
    }
}
