//! Shared test utilities for `LedgerBuddy`.
//!
//! Helpers for setting up an initialized in-memory ledger and building
//! decimal amounts from literals.

use crate::{core::ledger::Ledger, errors::Result};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::str::FromStr;

/// Opens an empty in-memory `SQLite` database.
///
/// The pool is pinned to one connection: every `SQLite` in-memory connection
/// is its own database, so a second pooled connection would not see the table.
pub async fn memory_connection() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    Ok(Database::connect(options).await?)
}

/// Creates an initialized ledger over an in-memory `SQLite` database.
pub async fn setup_test_ledger() -> Result<Ledger> {
    Ledger::initialize(memory_connection().await?).await
}

/// Parses a decimal literal, panicking on bad test input.
///
/// # Panics
/// If `literal` is not a valid decimal.
#[allow(clippy::unwrap_used)]
#[must_use]
pub fn dec(literal: &str) -> Decimal {
    Decimal::from_str(literal).unwrap()
}
