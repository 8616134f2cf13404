use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::category::Category;
use crate::money::Money;

#[derive(Debug, Clone, Error)]
pub enum RecordError {
    #[error("unknown transaction type: '{0}'")]
    UnknownKind(String),
    #[error("invalid date: '{0}'")]
    InvalidDate(String),
    #[error("row index {0} is out of range (data rows start at 2)")]
    RowOutOfRange(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Expense,
    Income,
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxKind::Expense => write!(f, "expense"),
            TxKind::Income => write!(f, "income"),
        }
    }
}

impl FromStr for TxKind {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "pengeluaran" => Ok(TxKind::Expense),
            "income" | "pemasukan" => Ok(TxKind::Income),
            other => Err(RecordError::UnknownKind(other.to_string())),
        }
    }
}

/// A transaction as written to the sheet: one row per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub category: Category,
    pub note: String,
}

/// A record read back from the sheet, carrying its 1-based sheet row number
/// (data rows start at 2, below the header) and the write timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetRow {
    pub row: u32,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub record: TransactionRecord,
}
