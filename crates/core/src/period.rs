use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Reporting window, resolved against a reference "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    All,
    CurrentMonth,
    LastMonth,
    Last3Months,
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap()
}

impl Period {
    /// The inclusive date range this period covers, or `None` for `All`.
    pub fn range(self, today: NaiveDate) -> Option<DateRange> {
        match self {
            Period::All => None,
            Period::CurrentMonth => Some(DateRange::new(month_start(today), today)),
            Period::LastMonth => {
                let current_start = month_start(today);
                let last_end = current_start - Duration::days(1);
                Some(DateRange::new(month_start(last_end), last_end))
            }
            Period::Last3Months => {
                let start = month_start(today) - Duration::days(90);
                Some(DateRange::new(start, today))
            }
        }
    }

    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        match self.range(today) {
            None => true,
            Some(range) => range.contains(date),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::All => write!(f, "all"),
            Period::CurrentMonth => write!(f, "current_month"),
            Period::LastMonth => write!(f, "last_month"),
            Period::Last3Months => write!(f, "last_3_months"),
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Period::All),
            "current_month" => Ok(Period::CurrentMonth),
            "last_month" => Ok(Period::LastMonth),
            "last_3_months" => Ok(Period::Last3Months),
            other => Err(format!("unknown period: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn all_has_no_range() {
        assert_eq!(Period::All.range(date(2025, 3, 15)), None);
        assert!(Period::All.contains(date(1999, 1, 1), date(2025, 3, 15)));
    }

    #[test]
    fn current_month_starts_on_the_first() {
        let range = Period::CurrentMonth.range(date(2025, 3, 15)).unwrap();
        assert_eq!(range.start, date(2025, 3, 1));
        assert_eq!(range.end, date(2025, 3, 15));
    }

    #[test]
    fn last_month_covers_previous_calendar_month() {
        let range = Period::LastMonth.range(date(2025, 3, 15)).unwrap();
        assert_eq!(range.start, date(2025, 2, 1));
        assert_eq!(range.end, date(2025, 2, 28));
    }

    #[test]
    fn last_month_across_year_boundary() {
        let range = Period::LastMonth.range(date(2025, 1, 10)).unwrap();
        assert_eq!(range.start, date(2024, 12, 1));
        assert_eq!(range.end, date(2024, 12, 31));
    }

    #[test]
    fn last_three_months_reaches_back_90_days() {
        let range = Period::Last3Months.range(date(2025, 4, 20)).unwrap();
        assert_eq!(range.start, date(2025, 4, 1) - Duration::days(90));
        assert_eq!(range.end, date(2025, 4, 20));
    }

    #[test]
    fn contains_respects_boundaries() {
        let today = date(2025, 3, 15);
        assert!(Period::CurrentMonth.contains(date(2025, 3, 1), today));
        assert!(!Period::CurrentMonth.contains(date(2025, 2, 28), today));
        assert!(Period::LastMonth.contains(date(2025, 2, 28), today));
        assert!(!Period::LastMonth.contains(date(2025, 3, 1), today));
    }

    #[test]
    fn period_from_str() {
        assert_eq!("last_month".parse::<Period>().unwrap(), Period::LastMonth);
        assert!("yearly".parse::<Period>().is_err());
    }
}
