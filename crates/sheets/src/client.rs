use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use mabot_core::{SheetRow, TransactionRecord};

use crate::auth::ServiceAccountAuth;
use crate::rows::{record_to_values, rows_from_values, FIRST_DATA_ROW, HEADER};
use crate::SheetsError;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Build the `deleteDimension` body for exactly one sheet row. Row indices
/// here are 1-based sheet rows; the API takes a 0-based half-open range.
fn delete_row_request(sheet_id: i64, row: u32) -> Result<Value, SheetsError> {
    if row < FIRST_DATA_ROW {
        return Err(SheetsError::RowOutOfRange(row));
    }
    Ok(json!({
        "requests": [{
            "deleteDimension": {
                "range": {
                    "sheetId": sheet_id,
                    "dimension": "ROWS",
                    "startIndex": row - 1,
                    "endIndex": row,
                }
            }
        }]
    }))
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    #[serde(rename = "sheetId")]
    sheet_id: i64,
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Thin client over the Sheets v4 REST API. One instance serves every user
/// spreadsheet; the worksheet title is fixed by configuration.
pub struct SheetsClient {
    http: Client,
    auth: Arc<ServiceAccountAuth>,
    sheet_name: String,
    // sheetId per spreadsheet, learned lazily from metadata.
    sheet_ids: Mutex<HashMap<String, i64>>,
}

impl SheetsClient {
    pub fn new(auth: Arc<ServiceAccountAuth>, sheet_name: impl Into<String>) -> Result<Self, SheetsError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(SheetsClient {
            http,
            auth,
            sheet_name: sheet_name.into(),
            sheet_ids: Mutex::new(HashMap::new()),
        })
    }

    async fn bearer(&self) -> Result<String, SheetsError> {
        self.auth.access_token(&self.http).await
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "sheets request failed");
        Err(SheetsError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Resolve the worksheet's sheetId, creating the worksheet (with its
    /// header row) the first time a spreadsheet is used.
    pub async fn ensure_worksheet(&self, spreadsheet_id: &str) -> Result<i64, SheetsError> {
        if let Some(&id) = self.sheet_ids.lock().await.get(spreadsheet_id) {
            return Ok(id);
        }

        let token = self.bearer().await?;
        let url = format!("{SHEETS_API_BASE}/{spreadsheet_id}?fields=sheets.properties");
        let response = self.http.get(&url).bearer_auth(&token).send().await?;
        let meta: SpreadsheetMeta = Self::check(response).await?.json().await?;

        let sheet_id = match meta
            .sheets
            .iter()
            .find(|s| s.properties.title == self.sheet_name)
        {
            Some(sheet) => sheet.properties.sheet_id,
            None => {
                let id = self.add_worksheet(spreadsheet_id, &token).await?;
                self.append_values(
                    spreadsheet_id,
                    &token,
                    HEADER.iter().map(|h| h.to_string()).collect(),
                )
                .await?;
                tracing::info!(spreadsheet_id, sheet = %self.sheet_name, "created worksheet");
                id
            }
        };

        self.sheet_ids
            .lock()
            .await
            .insert(spreadsheet_id.to_string(), sheet_id);
        Ok(sheet_id)
    }

    async fn add_worksheet(&self, spreadsheet_id: &str, token: &str) -> Result<i64, SheetsError> {
        let url = format!("{SHEETS_API_BASE}/{spreadsheet_id}:batchUpdate");
        let body = json!({
            "requests": [{
                "addSheet": { "properties": { "title": self.sheet_name } }
            }]
        });
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let reply: Value = Self::check(response).await?.json().await?;
        reply["replies"][0]["addSheet"]["properties"]["sheetId"]
            .as_i64()
            .ok_or_else(|| SheetsError::Api {
                status: 200,
                message: "addSheet reply missing sheetId".to_string(),
            })
    }

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        token: &str,
        values: Vec<String>,
    ) -> Result<(), SheetsError> {
        let url = format!(
            "{SHEETS_API_BASE}/{spreadsheet_id}/values/{}!A:F:append?valueInputOption=USER_ENTERED",
            self.sheet_name
        );
        let body = json!({ "values": [values] });
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Append one transaction row, stamped with the write time.
    pub async fn append_row(
        &self,
        spreadsheet_id: &str,
        record: &TransactionRecord,
    ) -> Result<(), SheetsError> {
        self.ensure_worksheet(spreadsheet_id).await?;
        let token = self.bearer().await?;
        self.append_values(spreadsheet_id, &token, record_to_values(record, Utc::now()))
            .await?;
        tracing::info!(spreadsheet_id, "transaction appended");
        Ok(())
    }

    /// All data rows, keeping their 1-based sheet row numbers.
    pub async fn read_rows(&self, spreadsheet_id: &str) -> Result<Vec<SheetRow>, SheetsError> {
        self.ensure_worksheet(spreadsheet_id).await?;
        let token = self.bearer().await?;
        let url = format!(
            "{SHEETS_API_BASE}/{spreadsheet_id}/values/{}!A{FIRST_DATA_ROW}:F",
            self.sheet_name
        );
        let response = self.http.get(&url).bearer_auth(&token).send().await?;
        let range: ValueRange = Self::check(response).await?.json().await?;
        Ok(rows_from_values(&range.values))
    }

    /// Overwrite one row in place. The timestamp is refreshed, since the row
    /// content changed.
    pub async fn update_row(
        &self,
        spreadsheet_id: &str,
        row: u32,
        record: &TransactionRecord,
    ) -> Result<(), SheetsError> {
        if row < FIRST_DATA_ROW {
            return Err(SheetsError::RowOutOfRange(row));
        }
        self.ensure_worksheet(spreadsheet_id).await?;
        let token = self.bearer().await?;
        let url = format!(
            "{SHEETS_API_BASE}/{spreadsheet_id}/values/{sheet}!A{row}:F{row}?valueInputOption=USER_ENTERED",
            sheet = self.sheet_name
        );
        let body = json!({ "values": [record_to_values(record, Utc::now())] });
        let response = self
            .http
            .put(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        tracing::info!(spreadsheet_id, row, "transaction updated");
        Ok(())
    }

    /// Remove exactly one row; rows below shift up, as in the spreadsheet UI.
    pub async fn delete_row(&self, spreadsheet_id: &str, row: u32) -> Result<(), SheetsError> {
        let sheet_id = self.ensure_worksheet(spreadsheet_id).await?;
        let body = delete_row_request(sheet_id, row)?;
        let token = self.bearer().await?;
        let url = format!("{SHEETS_API_BASE}/{spreadsheet_id}:batchUpdate");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        tracing::info!(spreadsheet_id, row, "transaction deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_targets_exactly_one_row() {
        let body = delete_row_request(7, 5).unwrap();
        let range = &body["requests"][0]["deleteDimension"]["range"];
        assert_eq!(range["sheetId"], 7);
        assert_eq!(range["dimension"], "ROWS");
        // 1-based sheet row 5 is the half-open 0-based range [4, 5).
        assert_eq!(range["startIndex"], 4);
        assert_eq!(range["endIndex"], 5);
    }

    #[test]
    fn header_and_first_data_row_are_protected() {
        assert!(matches!(
            delete_row_request(7, 1),
            Err(SheetsError::RowOutOfRange(1))
        ));
        assert!(matches!(
            delete_row_request(7, 0),
            Err(SheetsError::RowOutOfRange(0))
        ));
        assert!(delete_row_request(7, 2).is_ok());
    }
}
