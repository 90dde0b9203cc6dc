//! Decimal helpers for currency amounts and stock quantities.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts and quantities are `rust_decimal::Decimal` throughout; the
//! settlement epsilon below is kept as currency slack when comparing sums
//! entered by hand (e.g. three payments of 333.33 against a bill of 1000).

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency-unit slack used when comparing settlement sums (0.01).
pub const SETTLEMENT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Decimal places kept on computed line totals.
pub const LINE_TOTAL_SCALE: u32 = 4;

/// Returns `quantity × unit_price` rounded with Banker's Rounding, or `None`
/// when the product does not fit in a `Decimal`.
#[must_use]
pub fn line_total(quantity: Decimal, unit_price: Decimal) -> Option<Decimal> {
    quantity
        .checked_mul(unit_price)
        .map(|v| v.round_dp_with_strategy(LINE_TOTAL_SCALE, RoundingStrategy::MidpointNearestEven))
}

/// Returns true if `amount` is larger than `headroom` by more than the epsilon.
#[must_use]
pub fn exceeds(amount: Decimal, headroom: Decimal) -> bool {
    amount > headroom + SETTLEMENT_EPSILON
}

/// Returns true if an outstanding amount is close enough to zero to count as settled.
#[must_use]
pub fn is_settled(remaining: Decimal) -> bool {
    remaining <= SETTLEMENT_EPSILON
}

/// Returns true if a balance has gone negative beyond the epsilon.
#[must_use]
pub fn is_below_zero(value: Decimal) -> bool {
    value < -SETTLEMENT_EPSILON
}

/// Clamps a derived balance at zero for display.
#[must_use]
pub fn floor_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}
