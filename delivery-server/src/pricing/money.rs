//! Money helpers using rust_decimal for precision
//!
//! Amounts travel as `f64` on the wire and in storage. All arithmetic is
//! done in `Decimal` and rounded to cents before converting back.

use rust_decimal::prelude::*;

/// Rounding for monetary values (2 decimal places, half away from zero)
pub const DECIMAL_PLACES: u32 = 2;

/// Largest amount accepted for any single price or client-supplied sum
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Convert f64 to Decimal for calculation
///
/// `None` for NaN, infinities and anything beyond `±MAX_PRICE`, so every
/// amount that reaches the arithmetic below fits comfortably in a `Decimal`.
#[inline]
pub fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() || value.abs() > MAX_PRICE {
        return None;
    }
    Decimal::from_f64(value)
}

/// [`to_decimal`] for values that must also be non-negative
#[inline]
pub fn to_price(value: f64) -> Option<Decimal> {
    to_decimal(value).filter(|d| *d >= Decimal::ZERO)
}

/// Round to cents
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

/// Same amount once both sides are rounded to cents
pub fn same_amount(a: f64, b: Decimal) -> bool {
    to_decimal(a).is_some_and(|a| round_money(a) == round_money(b))
}

/// `value` reduced by `percent` (0-100)
pub fn apply_discount(value: Decimal, percent: Decimal) -> Decimal {
    value * (Decimal::ONE_HUNDRED - percent) / Decimal::ONE_HUNDRED
}
