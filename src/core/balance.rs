//! Balance aggregation - net balance from per-kind totals.

use crate::core::{amount, ledger::Totals};
use rust_decimal::Decimal;
use std::fmt;

/// Income, expense, and their difference for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Balance {
    /// Sum of income entries
    pub income: Decimal,
    /// Sum of expense entries
    pub expense: Decimal,
    /// `income - expense`, may be negative
    pub net: Decimal,
}

/// Computes the net balance. Exact decimal arithmetic, no failure modes.
#[must_use]
pub fn compute_balance(income_total: Decimal, expense_total: Decimal) -> Balance {
    Balance {
        income: income_total,
        expense: expense_total,
        net: income_total - expense_total,
    }
}

impl From<Totals> for Balance {
    fn from(totals: Totals) -> Self {
        compute_balance(totals.income, totals.expense)
    }
}

/// Three report lines, each value with two fractional digits.
impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Income: {}", amount::format(self.income))?;
        writeln!(f, "Expenses: {}", amount::format(self.expense))?;
        write!(f, "Net: {}", amount::format(self.net))
    }
}
