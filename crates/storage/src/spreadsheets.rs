use serde::Serialize;

use crate::db::DbPool;
use crate::StorageError;

#[derive(Debug, Clone, Serialize)]
pub struct UserSpreadsheet {
    pub spreadsheet_id: String,
    pub spreadsheet_name: Option<String>,
    pub created_at: String,
}

/// Register a spreadsheet for a user. Re-adding an existing one updates the
/// display name instead of failing.
pub async fn add_spreadsheet(
    pool: &DbPool,
    user_id: i64,
    spreadsheet_id: &str,
    spreadsheet_name: &str,
) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        INSERT INTO user_spreadsheets (user_id, spreadsheet_id, spreadsheet_name)
        VALUES (?, ?, ?)
        ON CONFLICT (user_id, spreadsheet_id)
        DO UPDATE SET spreadsheet_name = excluded.spreadsheet_name
        "#,
    )
    .bind(user_id)
    .bind(spreadsheet_id)
    .bind(spreadsheet_name)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_spreadsheet(
    pool: &DbPool,
    user_id: i64,
    spreadsheet_id: &str,
) -> Result<bool, StorageError> {
    let result =
        sqlx::query("DELETE FROM user_spreadsheets WHERE user_id = ? AND spreadsheet_id = ?")
            .bind(user_id)
            .bind(spreadsheet_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_user_spreadsheets(
    pool: &DbPool,
    user_id: i64,
) -> Result<Vec<UserSpreadsheet>, StorageError> {
    let rows: Vec<(String, Option<String>, String)> = sqlx::query_as(
        r#"
        SELECT spreadsheet_id, spreadsheet_name, created_at
        FROM user_spreadsheets
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(spreadsheet_id, spreadsheet_name, created_at)| UserSpreadsheet {
            spreadsheet_id,
            spreadsheet_name,
            created_at,
        })
        .collect())
}

pub async fn user_owns_spreadsheet(
    pool: &DbPool,
    user_id: i64,
    spreadsheet_id: &str,
) -> Result<bool, StorageError> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM user_spreadsheets WHERE user_id = ? AND spreadsheet_id = ?",
    )
    .bind(user_id)
    .bind(spreadsheet_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}
