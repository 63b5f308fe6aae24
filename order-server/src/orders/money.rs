//! Money calculation using rust_decimal
//!
//! All amounts carry 2 decimal places. Tax is rounded once, half away from
//! zero, after the multiply; the total is then an exact sum.

use rust_decimal::prelude::*;
use shared::models::OrderLine;

/// Currency scale
const DECIMAL_PLACES: u32 = 2;

/// Round a monetary value to 2 decimal places (half away from zero)
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Computed order amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// `subtotal = Σ qty × unit_price`, `tax = round(subtotal × rate)`,
/// `total = subtotal + tax`
pub fn compute_totals(lines: &[OrderLine], tax_rate: Decimal) -> Totals {
    let subtotal = round_money(lines.iter().map(OrderLine::line_total).sum());
    let tax = round_money(subtotal * tax_rate);
    Totals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}
