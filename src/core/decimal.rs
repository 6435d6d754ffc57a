//! Exact decimal arithmetic for feed quotations.
//!
//! The feed quotes "amount HUF per unit of currency". Everything here works on
//! `rust_decimal::Decimal` so the published scale survives and no binary float
//! ever touches a rate.

use crate::core::rates::Quotation;
use rust_decimal::Decimal;

/// HUF per one unit of base currency.
///
/// A unit of one returns the amount untouched, trailing zeros included. Other
/// units multiply the amount by the trimmed reciprocal of the unit. Returns
/// `None` for a zero unit or on overflow.
pub fn normalize(quotation: &Quotation) -> Option<Decimal> {
    if quotation.unit == Decimal::ONE {
        return Some(quotation.amount);
    }
    let multiplier = trim_zeros(invert(quotation.unit)?);
    quotation.amount.checked_mul(multiplier)
}

/// Reciprocal of `value`. Terminating for the powers of ten the feed uses;
/// otherwise rounded at the 28 digit scale `Decimal` supports.
pub fn invert(value: Decimal) -> Option<Decimal> {
    Decimal::ONE.checked_div(value)
}

pub fn trim_zeros(value: Decimal) -> Decimal {
    value.normalize()
}

pub fn multiply(lhs: Decimal, rhs: Decimal) -> Option<Decimal> {
    lhs.checked_mul(rhs)
}
