use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use mabot_core::{Category, Money, Period, SheetRow, TxKind};

#[derive(Debug, Clone, Serialize)]
pub struct Totals {
    pub income: Money,
    pub expense: Money,
    pub balance: Money,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Money,
}

/// Income and expense for one calendar month, keyed by its first day.
#[derive(Debug, Clone, Serialize)]
pub struct MonthBucket {
    pub month: NaiveDate,
    pub income: Money,
    pub expense: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Chart-ready aggregation over sheet rows. Everything here is a plain fold
/// over the input; the invariant is that every total equals the sum of the
/// rows it claims to cover.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub totals: Totals,
    pub expense_by_category: Vec<CategoryTotal>,
    pub income_by_category: Vec<CategoryTotal>,
    pub monthly: Vec<MonthBucket>,
    pub daily_counts: Vec<DailyCount>,
    pub top_expenses: Vec<SheetRow>,
    pub recent: Vec<SheetRow>,
}

pub fn filter_rows<'a>(
    rows: &'a [SheetRow],
    period: Period,
    today: NaiveDate,
    kind: Option<TxKind>,
    category: Option<&Category>,
) -> Vec<&'a SheetRow> {
    rows.iter()
        .filter(|r| period.contains(r.record.date, today))
        .filter(|r| kind.is_none_or(|k| r.record.kind == k))
        .filter(|r| category.is_none_or(|c| &r.record.category == c))
        .collect()
}

pub fn totals(rows: &[&SheetRow]) -> Totals {
    let income: Money = rows
        .iter()
        .filter(|r| r.record.kind == TxKind::Income)
        .map(|r| r.record.amount)
        .sum();
    let expense: Money = rows
        .iter()
        .filter(|r| r.record.kind == TxKind::Expense)
        .map(|r| r.record.amount)
        .sum();
    Totals {
        income,
        expense,
        balance: income - expense,
        count: rows.len(),
    }
}

pub fn by_category(rows: &[&SheetRow], kind: TxKind) -> Vec<CategoryTotal> {
    let mut map: BTreeMap<String, (Category, Money)> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.record.kind == kind) {
        let entry = map
            .entry(row.record.category.to_string())
            .or_insert_with(|| (row.record.category.clone(), Money::zero()));
        entry.1 = entry.1 + row.record.amount;
    }
    let mut out: Vec<CategoryTotal> = map
        .into_values()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();
    out.sort_by(|a, b| b.total.cmp(&a.total));
    out
}

pub fn monthly(rows: &[&SheetRow]) -> Vec<MonthBucket> {
    let mut map: BTreeMap<NaiveDate, (Money, Money)> = BTreeMap::new();
    for row in rows {
        let month = row.record.date.with_day(1).expect("day 1 always valid");
        let entry = map.entry(month).or_insert((Money::zero(), Money::zero()));
        match row.record.kind {
            TxKind::Income => entry.0 = entry.0 + row.record.amount,
            TxKind::Expense => entry.1 = entry.1 + row.record.amount,
        }
    }
    map.into_iter()
        .map(|(month, (income, expense))| MonthBucket {
            month,
            income,
            expense,
        })
        .collect()
}

pub fn daily_counts(rows: &[&SheetRow]) -> Vec<DailyCount> {
    let mut map: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for row in rows {
        *map.entry(row.record.date).or_insert(0) += 1;
    }
    map.into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

pub fn top_expenses(rows: &[&SheetRow], limit: usize) -> Vec<SheetRow> {
    let mut expenses: Vec<&&SheetRow> = rows
        .iter()
        .filter(|r| r.record.kind == TxKind::Expense)
        .collect();
    expenses.sort_by(|a, b| b.record.amount.cmp(&a.record.amount));
    expenses.into_iter().take(limit).map(|r| (**r).clone()).collect()
}

pub fn recent(rows: &[&SheetRow], limit: usize) -> Vec<SheetRow> {
    let mut sorted: Vec<&&SheetRow> = rows.iter().collect();
    sorted.sort_by(|a, b| b.record.date.cmp(&a.record.date).then(b.row.cmp(&a.row)));
    sorted.into_iter().take(limit).map(|r| (**r).clone()).collect()
}

/// Rows whose note contains the keyword, case-insensitively, newest first.
pub fn find_by_keyword(rows: &[SheetRow], keyword: &str, limit: usize) -> Vec<SheetRow> {
    let needle = keyword.to_lowercase();
    let mut found: Vec<&SheetRow> = rows
        .iter()
        .filter(|r| r.record.note.to_lowercase().contains(&needle))
        .collect();
    found.sort_by(|a, b| b.record.date.cmp(&a.record.date));
    found.into_iter().take(limit).cloned().collect()
}

impl Report {
    pub fn build(rows: &[SheetRow], period: Period, today: NaiveDate) -> Report {
        let filtered = filter_rows(rows, period, today, None, None);
        Report {
            totals: totals(&filtered),
            expense_by_category: by_category(&filtered, TxKind::Expense),
            income_by_category: by_category(&filtered, TxKind::Income),
            monthly: monthly(&filtered),
            daily_counts: daily_counts(&filtered),
            top_expenses: top_expenses(&filtered, 10),
            recent: recent(&filtered, 10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mabot_core::TransactionRecord;

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

    fn sample() -> Vec<SheetRow> {
        vec![
            row(2, date(2025, 3, 1), 5_000_000.0, TxKind::Income, Category::Income, "gaji maret"),
            row(3, date(2025, 3, 2), 25_000.0, TxKind::Expense, Category::Food, "nasi goreng"),
            row(4, date(2025, 3, 2), 15_000.0, TxKind::Expense, Category::Transport, "ojek"),
            row(5, date(2025, 3, 10), 120_000.0, TxKind::Expense, Category::Food, "makan keluarga"),
            row(6, date(2025, 2, 20), 80_000.0, TxKind::Expense, Category::Bills, "listrik"),
        ]
    }

    #[test]
    fn totals_equal_sum_of_rows() {
        let rows = sample();
        let all = filter_rows(&rows, Period::All, date(2025, 3, 15), None, None);
        let t = totals(&all);
        assert_eq!(t.income.to_f64(), 5_000_000.0);
        assert_eq!(t.expense.to_f64(), 25_000.0 + 15_000.0 + 120_000.0 + 80_000.0);
        assert_eq!(t.balance, t.income - t.expense);
        assert_eq!(t.count, 5);
    }

    #[test]
    fn category_totals_equal_their_rows() {
        let rows = sample();
        let all = filter_rows(&rows, Period::All, date(2025, 3, 15), None, None);
        let cats = by_category(&all, TxKind::Expense);

        let food = cats.iter().find(|c| c.category == Category::Food).unwrap();
        assert_eq!(food.total.to_f64(), 145_000.0);
        // Sorted descending by total.
        assert_eq!(cats[0].category, Category::Food);
        // Category totals sum back to the overall expense total.
        let sum: Money = cats.iter().map(|c| c.total).sum();
        assert_eq!(sum, totals(&all).expense);
    }

    #[test]
    fn period_filter_restricts_totals() {
        let rows = sample();
        let today = date(2025, 3, 15);
        let current = filter_rows(&rows, Period::CurrentMonth, today, None, None);
        assert_eq!(totals(&current).expense.to_f64(), 160_000.0);

        let last = filter_rows(&rows, Period::LastMonth, today, None, None);
        assert_eq!(totals(&last).expense.to_f64(), 80_000.0);
        assert_eq!(totals(&last).count, 1);
    }

    #[test]
    fn category_and_kind_filters_compose() {
        let rows = sample();
        let food = filter_rows(
            &rows,
            Period::All,
            date(2025, 3, 15),
            Some(TxKind::Expense),
            Some(&Category::Food),
        );
        assert_eq!(food.len(), 2);
        assert_eq!(totals(&food).expense.to_f64(), 145_000.0);
    }

    #[test]
    fn monthly_buckets_split_by_calendar_month() {
        let rows = sample();
        let all = filter_rows(&rows, Period::All, date(2025, 3, 15), None, None);
        let months = monthly(&all);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, date(2025, 2, 1));
        assert_eq!(months[0].expense.to_f64(), 80_000.0);
        assert_eq!(months[1].month, date(2025, 3, 1));
        assert_eq!(months[1].income.to_f64(), 5_000_000.0);
    }

    #[test]
    fn daily_counts_group_same_day() {
        let rows = sample();
        let all = filter_rows(&rows, Period::All, date(2025, 3, 15), None, None);
        let days = daily_counts(&all);
        let march2 = days.iter().find(|d| d.date == date(2025, 3, 2)).unwrap();
        assert_eq!(march2.count, 2);
        assert_eq!(days.iter().map(|d| d.count).sum::<usize>(), rows.len());
    }

    #[test]
    fn top_expenses_sorted_and_limited() {
        let rows = sample();
        let all = filter_rows(&rows, Period::All, date(2025, 3, 15), None, None);
        let top = top_expenses(&all, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].record.note, "makan keluarga");
        assert_eq!(top[1].record.note, "listrik");
    }

    #[test]
    fn recent_newest_first() {
        let rows = sample();
        let all = filter_rows(&rows, Period::All, date(2025, 3, 15), None, None);
        let latest = recent(&all, 3);
        assert_eq!(latest[0].record.note, "makan keluarga");
    }

    #[test]
    fn keyword_search_is_case_insensitive() {
        let rows = sample();
        let hits = find_by_keyword(&rows, "NASI", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.note, "nasi goreng");
        assert!(find_by_keyword(&rows, "pulsa", 10).is_empty());
    }

    #[test]
    fn report_is_internally_consistent() {
        let rows = sample();
        let report = Report::build(&rows, Period::All, date(2025, 3, 15));
        let cat_sum: Money = report.expense_by_category.iter().map(|c| c.total).sum();
        assert_eq!(cat_sum, report.totals.expense);
        let month_sum: Money = report.monthly.iter().map(|m| m.expense).sum();
        assert_eq!(month_sum, report.totals.expense);
    }
}
