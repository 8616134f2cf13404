use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

use mabot_core::{Period, SheetRow, TxKind};

use crate::report::{by_category, filter_rows, recent, top_expenses, totals};

const MONTH_NAMES: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September",
    "Oktober", "November", "Desember",
];

fn month_label(date: NaiveDate) -> String {
    format!("{} {}", MONTH_NAMES[date.month0() as usize], date.year())
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// The plain-text digest handed to the model when the user asks about their
/// data: overall stats, monthly trend, per category, largest and latest
/// transactions.
pub fn data_summary(rows: &[SheetRow], today: NaiveDate) -> String {
    if rows.is_empty() {
        return "Tidak ada data transaksi yang tersedia.".to_string();
    }

    let all = filter_rows(rows, Period::All, today, None, None);
    let t = totals(&all);

    let current = filter_rows(rows, Period::CurrentMonth, today, None, None);
    let tc = totals(&current);
    let last = filter_rows(rows, Period::LastMonth, today, None, None);
    let tl = totals(&last);
    let last_month_label = Period::LastMonth
        .range(today)
        .map(|r| month_label(r.start))
        .unwrap_or_default();

    let mut s = String::new();
    let _ = writeln!(s, "RINGKASAN DATA KEUANGAN:\n");
    let _ = writeln!(s, "STATISTIK UMUM:");
    let _ = writeln!(s, "- Total Pemasukan: Rp {}", t.income.format_idr());
    let _ = writeln!(s, "- Total Pengeluaran: Rp {}", t.expense.format_idr());
    let _ = writeln!(s, "- Saldo Bersih: Rp {}", t.balance.format_idr());
    let _ = writeln!(s, "- Jumlah Transaksi: {}\n", t.count);

    let _ = writeln!(s, "TREN BULANAN:");
    let _ = writeln!(s, "Bulan Ini ({}):", month_label(today));
    let _ = writeln!(s, "- Pemasukan: Rp {}", tc.income.format_idr());
    let _ = writeln!(s, "- Pengeluaran: Rp {}\n", tc.expense.format_idr());
    let _ = writeln!(s, "Bulan Lalu ({last_month_label}):");
    let _ = writeln!(s, "- Pemasukan: Rp {}", tl.income.format_idr());
    let _ = writeln!(s, "- Pengeluaran: Rp {}\n", tl.expense.format_idr());

    let _ = writeln!(s, "PENGELUARAN PER KATEGORI:");
    for cat in by_category(&all, TxKind::Expense) {
        let _ = writeln!(
            s,
            "- {}: Rp {} ({:.1}%)",
            cat.category,
            cat.total.format_idr(),
            percent(cat.total.to_f64(), t.expense.to_f64())
        );
    }

    let _ = writeln!(s, "\nPEMASUKAN PER KATEGORI:");
    for cat in by_category(&all, TxKind::Income) {
        let _ = writeln!(
            s,
            "- {}: Rp {} ({:.1}%)",
            cat.category,
            cat.total.format_idr(),
            percent(cat.total.to_f64(), t.income.to_f64())
        );
    }

    let _ = writeln!(s, "\n10 TRANSAKSI TERBESAR:");
    for row in top_expenses(&all, 10) {
        let _ = writeln!(
            s,
            "- {}: {} ({}) - Rp {}",
            row.record.date.format("%d/%m/%Y"),
            row.record.note,
            row.record.category,
            row.record.amount.format_idr()
        );
    }

    let _ = writeln!(s, "\n10 TRANSAKSI TERAKHIR:");
    for row in recent(&all, 10) {
        let _ = writeln!(
            s,
            "- {}: {} ({}) - Rp {} ({})",
            row.record.date.format("%d/%m/%Y"),
            row.record.note,
            row.record.category,
            row.record.amount.format_idr(),
            row.record.kind
        );
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use mabot_core::{Category, Money, TransactionRecord};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(n: u32, d: NaiveDate, amount: f64, kind: TxKind, category: Category, note: &str) -> SheetRow {
        SheetRow {
            row: n,
            timestamp: None,
            record: TransactionRecord {
                date: d,
                amount: Money::from_f64(amount).unwrap(),
                kind,
                category,
                note: note.to_string(),
            },
        }
    }

    #[test]
    fn empty_data_has_a_dedicated_message() {
        assert_eq!(
            data_summary(&[], date(2025, 3, 15)),
            "Tidak ada data transaksi yang tersedia."
        );
    }

    #[test]
    fn summary_contains_totals_and_sections() {
        let rows = vec![
            row(2, date(2025, 3, 1), 5_000_000.0, TxKind::Income, Category::Income, "gaji"),
            row(3, date(2025, 3, 2), 25_000.0, TxKind::Expense, Category::Food, "nasi goreng"),
        ];
        let s = data_summary(&rows, date(2025, 3, 15));

        assert!(s.contains("STATISTIK UMUM"));
        assert!(s.contains("Total Pemasukan: Rp 5.000.000,00"));
        assert!(s.contains("Total Pengeluaran: Rp 25.000,00"));
        assert!(s.contains("Saldo Bersih: Rp 4.975.000,00"));
        assert!(s.contains("Bulan Ini (Maret 2025)"));
        assert!(s.contains("Bulan Lalu (Februari 2025)"));
        assert!(s.contains("- food: Rp 25.000,00 (100.0%)"));
        assert!(s.contains("10 TRANSAKSI TERAKHIR"));
    }

    #[test]
    fn zero_expense_avoids_division_by_zero() {
        let rows = vec![row(
            2,
            date(2025, 3, 1),
            1_000.0,
            TxKind::Income,
            Category::Income,
            "gaji",
        )];
        let s = data_summary(&rows, date(2025, 3, 15));
        assert!(s.contains("Total Pengeluaran: Rp 0,00"));
    }
}
