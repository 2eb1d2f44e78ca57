//! Money amounts: `Decimal` with two fractional digits, bounded by NUMERIC(12, 2).

use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits kept for every amount.
pub const SCALE: u32 = 2;

/// Largest storable amount in hundredths, the bound of a NUMERIC(12, 2) column.
const MAX_HUNDREDTHS: i64 = 999_999_999_999;

/// Rounds to two fractional digits the way a NUMERIC(12, 2) column does on insert.
#[must_use]
pub fn round(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(SCALE);
    rounded
}

/// Largest amount the ledger accepts.
#[must_use]
pub fn max_amount() -> Decimal {
    Decimal::new(MAX_HUNDREDTHS, SCALE)
}

/// Renders with exactly two fractional digits, e.g. `1000.00` or `-12.50`.
#[must_use]
pub fn format(amount: Decimal) -> String {
    round(amount).to_string()
}
