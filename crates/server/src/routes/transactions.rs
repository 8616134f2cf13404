use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use mabot_analyzer::report::{filter_rows, find_by_keyword};
use mabot_core::{parse_amount, Category, Period, SheetRow, TransactionRecord, TxKind};
use mabot_sheets::rows::FIRST_DATA_ROW;

use crate::error::AppError;
use crate::session::AuthUser;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub spreadsheet_id: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Case-insensitive keyword match on the note.
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TxKind>,
    pub category: Option<Category>,
    #[serde(default)]
    pub period: Period,
}

#[derive(Debug, Serialize)]
pub struct TransactionPage {
    pub rows: Vec<SheetRow>,
    pub page: u32,
    pub page_size: u32,
    pub total: usize,
}

/// Transaction fields as submitted through the manual-entry form or the
/// pending-parse confirmation. The amount is free-form text ("50k", "50000").
#[derive(Debug, Deserialize)]
pub struct TransactionInput {
    pub spreadsheet_id: String,
    pub date: Option<NaiveDate>,
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub category: Option<Category>,
    #[serde(default)]
    pub note: String,
}

impl TransactionInput {
    fn into_record(self, today: NaiveDate) -> Result<TransactionRecord, AppError> {
        let amount = parse_amount(&self.amount)
            .map_err(|e| AppError::BadRequest(format!("invalid amount: {e}")))?;
        Ok(TransactionRecord {
            date: self.date.unwrap_or(today),
            amount,
            kind: self.kind,
            category: self.category.unwrap_or(Category::Uncategorized),
            note: self.note.trim().to_string(),
        })
    }
}

fn page_slice(rows: Vec<SheetRow>, page: u32, page_size: u32) -> Vec<SheetRow> {
    let start = (page.saturating_sub(1) as usize).saturating_mul(page_size as usize);
    rows.into_iter().skip(start).take(page_size as usize).collect()
}

/// Keyword, kind, category and period narrowing, newest first. Separate from
/// the handler so it can be exercised without a live sheet.
fn select_rows(rows: Vec<SheetRow>, q: &ListQuery, today: NaiveDate) -> Vec<SheetRow> {
    let rows = match q.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(keyword) => find_by_keyword(&rows, keyword, rows.len()),
        None => rows,
    };
    let mut rows: Vec<SheetRow> = filter_rows(&rows, q.period, today, q.kind, q.category.as_ref())
        .into_iter()
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.record.date.cmp(&a.record.date).then(b.row.cmp(&a.row)));
    rows
}

/// Rows straight from the sheet, filtered and paginated server-side so a
/// years-long sheet does not land in one response.
pub async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<TransactionPage>, AppError> {
    super::ensure_owned(&state, user.id, &q.spreadsheet_id).await?;
    let page = q.page.unwrap_or(1).max(1);
    let page_size = q.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let all = state.sheets.read_rows(&q.spreadsheet_id).await?;
    let rows = select_rows(all, &q, Utc::now().date_naive());
    let total = rows.len();

    Ok(Json(TransactionPage {
        rows: page_slice(rows, page, page_size),
        page,
        page_size,
        total,
    }))
}

pub async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<TransactionInput>,
) -> Result<(StatusCode, Json<TransactionRecord>), AppError> {
    super::ensure_owned(&state, user.id, &input.spreadsheet_id).await?;
    let spreadsheet_id = input.spreadsheet_id.clone();
    let record = input.into_record(Utc::now().date_naive())?;

    state.sheets.append_row(&spreadsheet_id, &record).await?;
    info!(user_id = user.id, spreadsheet_id, "transaction saved");
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(row): Path<u32>,
    Json(input): Json<TransactionInput>,
) -> Result<Json<TransactionRecord>, AppError> {
    if row < FIRST_DATA_ROW {
        return Err(AppError::BadRequest(format!("row {row} is not a data row")));
    }
    super::ensure_owned(&state, user.id, &input.spreadsheet_id).await?;
    let spreadsheet_id = input.spreadsheet_id.clone();
    let record = input.into_record(Utc::now().date_naive())?;

    state.sheets.update_row(&spreadsheet_id, row, &record).await?;
    info!(user_id = user.id, spreadsheet_id, row, "transaction updated");
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub spreadsheet_id: String,
}

pub async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(row): Path<u32>,
    Query(q): Query<DeleteQuery>,
) -> Result<StatusCode, AppError> {
    if row < FIRST_DATA_ROW {
        return Err(AppError::BadRequest(format!("row {row} is not a data row")));
    }
    super::ensure_owned(&state, user.id, &q.spreadsheet_id).await?;

    state.sheets.delete_row(&q.spreadsheet_id, row).await?;
    info!(user_id = user.id, spreadsheet_id = %q.spreadsheet_id, row, "transaction deleted");
    Ok(StatusCode::NO_CONTENT)
}
