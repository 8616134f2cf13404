use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// A rupiah amount, rounded to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_decimal(decimal: Decimal) -> Self {
        // Half-up, not banker's: 10.005 becomes 10.01.
        Money(decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        Decimal::from_f64(value).map(Self::from_decimal)
    }

    pub fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Indonesian display format: dot as thousands separator, comma as
    /// decimal separator ("1.200.000,50").
    pub fn format_idr(self) -> String {
        let negative = self.0.is_sign_negative();
        let abs = self
            .0
            .abs()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let s = format!("{abs:.2}");
        let (int_part, frac_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

        let digits: Vec<char> = int_part.chars().collect();
        let mut grouped = String::new();
        for (i, c) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(*c);
        }

        let sign = if negative { "-" } else { "" };
        format!("{sign}{grouped},{frac_part}")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rp {}", self.format_idr())
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn money(s: &str) -> Money {
        Money::from_decimal(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn format_idr_groups_thousands() {
        assert_eq!(money("1200000.5").format_idr(), "1.200.000,50");
    }

    #[test]
    fn format_idr_small_amount() {
        assert_eq!(money("950").format_idr(), "950,00");
    }

    #[test]
    fn format_idr_exact_thousand() {
        assert_eq!(money("1000").format_idr(), "1.000,00");
    }

    #[test]
    fn format_idr_negative() {
        assert_eq!(money("-25000").format_idr(), "-25.000,00");
    }

    #[test]
    fn display_prefixes_rupiah() {
        assert_eq!(money("50000").to_string(), "Rp 50.000,00");
    }

    #[test]
    fn from_decimal_rounds_to_two_places() {
        assert_eq!(money("10.005"), money("10.01"));
    }

    #[test]
    fn sum_of_amounts() {
        let total: Money = vec![money("100"), money("200"), money("50.5")]
            .into_iter()
            .sum();
        assert_eq!(total, money("350.5"));
    }

    #[test]
    fn subtraction() {
        assert_eq!(money("500") - money("200"), money("300"));
    }
}
