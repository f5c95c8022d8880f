//! Money arithmetic for card balances and fares.
//!
//! Amounts are `rust_decimal::Decimal` values serialized as decimal strings,
//! rounded to 2 decimal places (round-half-away-from-zero) before they are
//! persisted or returned.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a monetary amount to 2 decimal places, half away from zero, and
/// normalize the scale so the amount always serializes with cents
/// (`"0.00"`, not `"0"`).
pub fn round2(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
