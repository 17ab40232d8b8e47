//! Shared numeric helpers for the calculators.
//!
//! All monetary outputs and percentages in the report go through these, so the
//! rounding policy lives in exactly one place.

use rust_decimal::{Decimal, RoundingStrategy};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rounds a value to 2 decimal places, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A division that yields 0 when the denominator is 0.
pub fn guarded_ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// A guarded ratio expressed as a percentage, rounded to 2 decimal places.
pub fn percentage(numerator: Decimal, denominator: Decimal) -> Decimal {
    round2(guarded_ratio(numerator, denominator) * HUNDRED)
}

/// Counts as decimals, for ratios over record counts.
pub fn dec(count: usize) -> Decimal {
    Decimal::from(count)
}
