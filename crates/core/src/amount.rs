use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use crate::money::Money;

#[derive(Debug, Clone, Error, PartialEq)]
#[error("cannot parse amount from '{input}'")]
pub struct AmountParseError {
    pub input: String,
}

/// Parse a free-form rupiah amount: "50k", "Rp 1.200.000", "1,200.50",
/// "1.200.000,50", "1000".
///
/// Heuristics: a trailing/embedded `k` multiplies by 1000; when only one
/// separator kind appears more than once it is a thousands separator; when
/// both kinds appear, the one further right is the decimal separator.
pub fn parse_amount(input: &str) -> Result<Money, AmountParseError> {
    let err = || AmountParseError {
        input: input.to_string(),
    };

    let lowered = input.trim().to_lowercase();
    // Keep digits, separators, sign and the 'k' shorthand.
    let mut text: String = lowered
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-' | 'k'))
        .collect();
    if text.is_empty() {
        return Err(err());
    }

    let kilo = text.contains('k');
    if kilo {
        text.retain(|c| c != 'k');
        text = text.replace(',', ".");
    } else {
        let dots = text.matches('.').count();
        let commas = text.matches(',').count();
        if dots > 0 && commas > 0 {
            // Rightmost separator wins as the decimal point.
            if text.rfind('.') > text.rfind(',') {
                text.retain(|c| c != ',');
            } else {
                text.retain(|c| c != '.');
                text = text.replace(',', ".");
            }
        } else if dots > 1 {
            text.retain(|c| c != '.');
        } else if commas > 1 {
            text.retain(|c| c != ',');
        } else if commas == 1 {
            text = text.replace(',', ".");
        }
    }

    let value = Decimal::from_str(&text).map_err(|_| err())?;
    let value = if kilo {
        value * Decimal::from(1000)
    } else {
        value
    };
    Ok(Money::from_decimal(value))
}
