//! Clamping helpers shared by every calculation in the engine.
//!
//! Inputs arrive unvalidated from an editing surface, so instead of
//! rejecting them the engine coerces them into range. Arithmetic on money
//! saturates at the Decimal bounds rather than overflowing.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Floor a value at zero.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Clamp a fraction into [0, 1].
pub fn clamp_unit(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(Decimal::ONE)
}

/// Coerce a duration into a whole, non-negative month (or year) count.
///
/// Fractions are floored; values beyond `u32::MAX` saturate.
pub fn whole_months(value: Decimal) -> u32 {
    non_negative(value).floor().to_u32().unwrap_or(u32::MAX)
}

/// `numerator / denominator`, or `None` when the denominator is zero.
///
/// A quotient too large to represent saturates to `Decimal::MAX` or
/// `Decimal::MIN` by sign.
pub fn safe_ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    Some(numerator.checked_div(denominator).unwrap_or_else(|| {
        if numerator.is_sign_negative() == denominator.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    }))
}

/// Sum that saturates at the Decimal bounds.
pub fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}
