//! Common numeric helpers shared by the calculator tools.
//!
//! Every division performed by a tool goes through [`safe_div`] so that a
//! zero denominator yields `None` instead of a panic. Products and totals go
//! through [`safe_mul`] and [`safe_sum`], and overflow is reported through
//! [`or_zero`].

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

/// Tolerance for proportion lists that must add up to 100.
pub const PROPORTION_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// One hundred, for percentage conversions.
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rounds a decimal value to `dp` decimal places using half-up rounding.
///
/// Values exactly at the midpoint are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use kd_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.455), 2), dec!(123.46));
/// assert_eq!(round_half_up(dec!(249.5), 0), dec!(250));
/// assert_eq!(round_half_up(dec!(249.49), 0), dec!(249));
/// ```
pub fn round_half_up(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Floors a non-negative quantity into a whole count.
///
/// Negative values clamp to zero; values beyond `u64` saturate.
///
/// ```
/// use rust_decimal_macros::dec;
/// use kd_core::calculations::common::floor_count;
///
/// assert_eq!(floor_count(dec!(7.99)), 7);
/// assert_eq!(floor_count(dec!(-1.5)), 0);
/// ```
pub fn floor_count(value: Decimal) -> u64 {
    if value <= Decimal::ZERO {
        return 0;
    }
    value.floor().to_u64().unwrap_or(u64::MAX)
}

/// Divides `numerator` by `denominator`, returning `None` when the
/// denominator is zero or the quotient overflows.
pub fn safe_div(
    numerator: Decimal,
    denominator: Decimal,
) -> Option<Decimal> {
    if denominator.is_zero() {
        None
    } else {
        numerator.checked_div(denominator)
    }
}

/// Multiplies two values, returning `None` when the product overflows.
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use kd_core::calculations::common::safe_mul;
///
/// assert_eq!(safe_mul(dec!(450), dec!(2.5)), Some(dec!(1125)));
/// assert_eq!(safe_mul(Decimal::MAX, dec!(2)), None);
/// ```
pub fn safe_mul(
    left: Decimal,
    right: Decimal,
) -> Option<Decimal> {
    left.checked_mul(right)
}

/// Adds up `values`, returning `None` when the total overflows.
pub fn safe_sum<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, Decimal::checked_add)
}

/// Unwraps a checked result, logging `quantity` and reporting zero when the
/// computation overflowed.
pub fn or_zero(
    value: Option<Decimal>,
    quantity: &'static str,
) -> Decimal {
    value.unwrap_or_else(|| {
        tracing::warn!(quantity, "value out of range; reporting zero");
        Decimal::ZERO
    })
}

/// Converts a percentage (0-100) into a fraction (0-1).
pub fn percent_to_fraction(percent: Decimal) -> Decimal {
    percent / HUNDRED
}

/// Returns true when `value` lies inside `[0, 100]`.
pub fn is_percentage(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= HUNDRED
}

/// Returns true when the proportions add up to 100 within
/// [`PROPORTION_TOLERANCE`].
pub fn sums_to_hundred<I>(proportions: I) -> bool
where
    I: IntoIterator<Item = Decimal>,
{
    safe_sum(proportions)
        .and_then(|total| total.checked_sub(HUNDRED))
        .is_some_and(|difference| difference.abs() <= PROPORTION_TOLERANCE)
}
