//! Shared arithmetic helpers for the calculation engines.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up
/// rounding (midpoints go away from zero, the standard financial convention).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use nestegg_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(64200.004)), dec!(64200.00));
/// assert_eq!(round_half_up(dec!(64200.005)), dec!(64200.01));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}
