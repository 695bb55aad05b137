//! Money parsing and display
//!
//! Amounts are `Decimal` everywhere; floats never touch a balance.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::result::MoneyError;

/// Currency label carried on every amount (no conversion is ever done)
pub const DEFAULT_CURRENCY: &str = "TTD";

/// Parse a user-entered amount ("40", "40.5", "$1,250.00")
///
/// Rejects anything that is not a plain decimal or that has more than two
/// fractional digits after trailing zeros are dropped. Sign is not checked
/// here; the movement engine decides whether an amount is acceptable.
pub fn parse_amount(input: &str) -> Result<Decimal, MoneyError> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    if cleaned.is_empty() {
        return Err(MoneyError::InvalidAmount);
    }

    let amount = Decimal::from_str(&cleaned).map_err(|_| MoneyError::InvalidAmount)?;
    if amount.normalize().scale() > 2 {
        return Err(MoneyError::InvalidAmount);
    }
    Ok(amount)
}

/// Format as `$1,234.50` (two decimals, thousands separators)
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${}.{}", grouped, cents)
    } else {
        format!("${}.{}", grouped, cents)
    }
}
