use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use mabot_analyzer::Report;
use mabot_core::Period;

use crate::error::AppError;
use crate::session::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub period: Period,
}

/// Chart-ready aggregates for the dashboard: totals, category breakdowns,
/// month buckets, top expenses and recent rows.
pub async fn summary(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(q): Query<SummaryQuery>,
) -> Result<Json<Report>, AppError> {
    super::ensure_owned(&state, user.id, &q.spreadsheet_id).await?;
    let rows = state.sheets.read_rows(&q.spreadsheet_id).await?;
    Ok(Json(Report::build(&rows, q.period, Utc::now().date_naive())))
}
