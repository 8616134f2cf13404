//! Pure codec between sheet cell values and `SheetRow`. Kept free of HTTP so
//! the row-mapping rules are testable on their own.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use mabot_core::{parse_amount, Category, Money, SheetRow, TransactionRecord, TxKind};

/// Header row written when a worksheet is created. One transaction per row.
pub const HEADER: [&str; 6] = ["timestamp", "date", "amount", "type", "category", "note"];

/// First data row: row 1 is the header.
pub const FIRST_DATA_ROW: u32 = 2;

pub fn record_to_values(record: &TransactionRecord, timestamp: DateTime<Utc>) -> Vec<String> {
    vec![
        timestamp.to_rfc3339(),
        record.date.format("%Y-%m-%d").to_string(),
        format!("{:.2}", record.amount.as_decimal()),
        record.kind.to_string(),
        record.category.to_string(),
        record.note.clone(),
    ]
}

fn cell(values: &[Value], idx: usize) -> String {
    match values.get(idx) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Decode one sheet row. Returns `None` for rows that cannot possibly be a
/// transaction (bad date or type); a bad amount degrades to zero instead,
/// so one mangled cell does not hide the row entirely.
pub fn row_from_values(row: u32, values: &[Value]) -> Option<SheetRow> {
    let date = NaiveDate::parse_from_str(&cell(values, 1), "%Y-%m-%d").ok()?;
    let amount = parse_amount(&cell(values, 2)).unwrap_or_else(|_| Money::zero());
    let kind = cell(values, 3).parse::<TxKind>().ok()?;
    let category = Category::normalize(&cell(values, 4));
    let note = cell(values, 5);
    let timestamp = DateTime::parse_from_rfc3339(&cell(values, 0))
        .ok()
        .map(|t| t.with_timezone(&Utc));

    Some(SheetRow {
        row,
        timestamp,
        record: TransactionRecord {
            date,
            amount,
            kind,
            category,
            note,
        },
    })
}

/// Decode a block of rows as returned by a `values.get` on `A2:F`, keeping
/// sheet row numbers stable even when some rows are skipped.
pub fn rows_from_values(values: &[Vec<Value>]) -> Vec<SheetRow> {
    values
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| row_from_values(FIRST_DATA_ROW + idx as u32, row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> TransactionRecord {
        TransactionRecord {
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            amount: Money::from_f64(25_000.0).unwrap(),
            kind: TxKind::Expense,
            category: Category::Food,
            note: "nasi goreng".to_string(),
        }
    }

    #[test]
    fn record_round_trips_through_values() {
        let ts = Utc::now();
        let values: Vec<Value> = record_to_values(&record(), ts)
            .into_iter()
            .map(Value::String)
            .collect();
        let row = row_from_values(2, &values).unwrap();

        assert_eq!(row.row, 2);
        assert_eq!(row.record, record());
        assert!(row.timestamp.is_some());
    }

    #[test]
    fn fields_map_in_schema_order() {
        let ts = Utc::now();
        let values = record_to_values(&record(), ts);
        assert_eq!(values.len(), HEADER.len());
        assert_eq!(values[1], "2025-03-14");
        assert_eq!(values[2], "25000.00");
        assert_eq!(values[3], "expense");
        assert_eq!(values[4], "food");
        assert_eq!(values[5], "nasi goreng");
    }

    #[test]
    fn numeric_cells_are_accepted() {
        let values = vec![
            json!(""),
            json!("2025-03-14"),
            json!(25000),
            json!("expense"),
            json!("food"),
            json!("nasi goreng"),
        ];
        let row = row_from_values(2, &values).unwrap();
        assert_eq!(row.record.amount.to_f64(), 25_000.0);
    }

    #[test]
    fn bad_amount_degrades_to_zero() {
        let values = vec![
            json!(""),
            json!("2025-03-14"),
            json!("###"),
            json!("expense"),
            json!("food"),
            json!(""),
        ];
        let row = row_from_values(2, &values).unwrap();
        assert!(row.record.amount.is_zero());
    }

    #[test]
    fn bad_date_or_kind_skips_the_row() {
        let bad_date = vec![json!(""), json!("soon"), json!("1"), json!("expense")];
        assert!(row_from_values(2, &bad_date).is_none());

        let bad_kind = vec![json!(""), json!("2025-03-14"), json!("1"), json!("transfer")];
        assert!(row_from_values(2, &bad_kind).is_none());
    }

    #[test]
    fn block_decode_keeps_row_numbers_stable() {
        let ts = Utc::now();
        let good: Vec<Value> = record_to_values(&record(), ts)
            .into_iter()
            .map(Value::String)
            .collect();
        let bad = vec![json!(""), json!("not-a-date")];
        let rows = rows_from_values(&[good.clone(), bad, good]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 2);
        // The skipped middle row still occupies sheet row 3.
        assert_eq!(rows[1].row, 4);
    }

    #[test]
    fn missing_timestamp_is_tolerated() {
        let values = vec![
            json!(""),
            json!("2025-03-14"),
            json!("5000"),
            json!("income"),
            json!("gaji"),
            json!(""),
        ];
        let row = row_from_values(5, &values).unwrap();
        assert!(row.timestamp.is_none());
        assert_eq!(row.record.category, Category::Income);
    }
}
