//! Money helpers

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// A monetary amount in one of the ISO currencies.
pub type Price = Money<'static, Currency>;

/// Errors raised while reading money from text.
#[derive(Debug, Error, PartialEq)]
pub enum MoneyParseError {
    /// The amount could not be read as a decimal number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The text was not in `AMOUNT CURRENCY` form.
    #[error("expected format 'AMOUNT CURRENCY', got: {0}")]
    InvalidFormat(String),

    /// The currency code is not an ISO 4217 code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Look up an ISO currency by its alphabetic code (e.g. `BRL`).
///
/// # Errors
///
/// Returns [`MoneyParseError::UnknownCurrency`] if the code is not recognised.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, MoneyParseError> {
    let code = code.trim().to_ascii_uppercase();

    iso::find(&code).ok_or(MoneyParseError::UnknownCurrency(code))
}

/// Parse a plain decimal amount (e.g. `"149.90"`) in the given currency.
///
/// Amounts with more precision than the currency allows are rounded half away from zero.
///
/// # Errors
///
/// Returns [`MoneyParseError::InvalidAmount`] if the text isn't a decimal number or doesn't fit
/// in minor units.
pub fn parse_amount(s: &str, currency: &'static Currency) -> Result<Price, MoneyParseError> {
    let amount = s
        .trim()
        .parse::<Decimal>()
        .map_err(|_err| MoneyParseError::InvalidAmount(s.to_string()))?;

    let minor_units = amount
        .checked_mul(minor_unit_scale(currency))
        .and_then(|value| {
            value
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
        .ok_or_else(|| MoneyParseError::InvalidAmount(s.to_string()))?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse a price string such as `"149.90 BRL"`.
///
/// # Errors
///
/// Returns an error if the string is not in the format `AMOUNT CURRENCY`, if the amount cannot be
/// parsed, or if the currency code is not recognised.
pub fn parse_price(s: &str) -> Result<Price, MoneyParseError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(MoneyParseError::InvalidFormat(s.to_string()));
    };

    parse_amount(amount, currency_from_code(code)?)
}

/// Zero in the given currency.
pub fn zero(currency: &'static Currency) -> Price {
    Money::from_minor(0, currency)
}

/// Number of minor units in one major unit of the currency (100 for BRL).
fn minor_unit_scale(currency: &Currency) -> Decimal {
    (0..currency.exponent).fold(Decimal::ONE, |scale, _| scale * Decimal::TEN)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{BRL, JPY, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_price_reads_amount_and_currency() -> TestResult {
        let price = parse_price("149.90 BRL")?;

        assert_eq!(price, Money::from_minor(149_90, BRL));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("149.90BRL");

        assert!(matches!(result, Err(MoneyParseError::InvalidFormat(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(MoneyParseError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_amount_rounds_to_minor_units() -> TestResult {
        assert_eq!(parse_amount("10.005", USD)?, Money::from_minor(10_01, USD));
        assert_eq!(parse_amount("1200", JPY)?, Money::from_minor(1200, JPY));

        Ok(())
    }

    #[test]
    fn parse_amount_rejects_text() {
        assert!(matches!(
            parse_amount("ten", BRL),
            Err(MoneyParseError::InvalidAmount(_))
        ));
    }

    #[test]
    fn currency_lookup_is_case_insensitive() -> TestResult {
        assert_eq!(currency_from_code(" brl ")?, BRL);

        Ok(())
    }
}
