pub mod auth;
pub mod client;
pub mod rows;

pub use auth::ServiceAccountAuth;
pub use client::SheetsClient;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("sheets request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sheets API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("service account error: {0}")]
    Auth(String),
    #[error("row {0} is out of range (data rows start at 2)")]
    RowOutOfRange(u32),
}
