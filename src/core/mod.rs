//! Core business logic - framework-agnostic ledger operations.
//!
//! Data flows validation -> ledger -> balance; `dispatch` ties the three
//! together behind a closed set of chat commands.

/// Fixed-point conversions and formatting for money amounts
pub mod amount;
/// Net balance computation and the balance report
pub mod balance;
/// Command parsing and the typed command handler
pub mod dispatch;
/// Durable, append-only store of transactions
pub mod ledger;
/// Parsing raw command arguments into well-formed entries
pub mod validation;
