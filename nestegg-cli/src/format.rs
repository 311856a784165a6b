use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas
/// (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`).
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Formats a decimal as a currency amount: two decimal places, comma
/// thousands separators, leading minus for negatives.
pub fn format_currency(value: Decimal) -> String {
    let rounded =
        value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());

    let mut int_part = plain.as_str();
    let mut frac_part = "00";
    if let Some((i, f)) = plain.split_once('.') {
        int_part = i;
        frac_part = f;
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (count, digit) in int_part.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let grouped: String = grouped.chars().rev().collect();

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_decimal_accepts_comma_thousands_separator() {
        assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("1,234,567.89").unwrap(), dec!(1234567.89));
    }

    #[test]
    fn parse_decimal_trims_whitespace() {
        assert_eq!(parse_decimal("  123.45  ").unwrap(), dec!(123.45));
    }

    #[test]
    fn parse_decimal_empty_treated_as_zero() {
        assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_decimal("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_invalid_returns_error() {
        assert!(parse_decimal("abc").is_err());
    }

    #[test]
    fn format_currency_groups_thousands() {
        assert_eq!(format_currency(dec!(1234567.891)), "1,234,567.89");
        assert_eq!(format_currency(dec!(64200)), "64,200.00");
        assert_eq!(format_currency(dec!(999.9)), "999.90");
    }

    #[test]
    fn format_currency_handles_negatives_and_zero() {
        assert_eq!(format_currency(dec!(-752.555)), "-752.56");
        assert_eq!(format_currency(dec!(0)), "0.00");
    }
}
