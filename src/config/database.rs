//! Database configuration module for `LedgerBuddy`.
//!
//! Resolves the connection URL from the environment, opens the SeaORM
//! connection pool, and creates the `transactions` table. Table creation uses
//! `Schema::create_table_from_entity` so the DDL follows the entity definition,
//! plus the CHECK constraints and user index the entity cannot express.

use crate::{
    config::settings::AppConfig,
    entities::{Transaction, TransactionColumn, TransactionKind},
    errors::{Error, Result},
};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema,
    sea_query::{Expr, Index},
};
use tracing::info;

/// Used when neither `DATABASE_URL` nor `DB_HOST` is set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://ledger_buddy.sqlite?mode=rwc";

const DEFAULT_POSTGRES_PORT: &str = "5432";

/// Works out the database URL from environment-style lookups.
///
/// `DATABASE_URL` wins. Otherwise `DB_HOST` switches to PostgreSQL and then
/// `DB_USER` and `DB_NAME` are required, `DB_PASSWORD` and `DB_PORT` optional.
/// With neither, a local `SQLite` file is used.
pub fn resolve_database_url<F>(lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL") {
        return Ok(url);
    }

    let Some(host) = lookup("DB_HOST") else {
        return Ok(DEFAULT_DATABASE_URL.to_string());
    };

    let require = |key: &str| {
        lookup(key).ok_or_else(|| Error::Config {
            message: format!("{key} must be set when DB_HOST is set"),
        })
    };
    let user = require("DB_USER")?;
    let name = require("DB_NAME")?;
    let port = lookup("DB_PORT").unwrap_or_else(|| DEFAULT_POSTGRES_PORT.to_string());
    let credentials = match lookup("DB_PASSWORD") {
        Some(password) => format!("{user}:{password}"),
        None => user,
    };

    Ok(format!("postgres://{credentials}@{host}:{port}/{name}"))
}

/// Opens the connection pool described by the application config.
///
/// Each ledger operation checks a connection out of this pool and returns it
/// when the statement completes.
pub async fn create_connection(config: &AppConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.max_connections)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!(
        backend = ?db.get_database_backend(),
        max_connections = config.max_connections,
        "Database connection pool opened"
    );
    Ok(db)
}

/// Creates the `transactions` table and its user index if they do not exist.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut transaction_table = schema.create_table_from_entity(Transaction);
    transaction_table
        .if_not_exists()
        .check(Expr::col(TransactionColumn::Kind).is_in([
            TransactionKind::Income.as_str(),
            TransactionKind::Expense.as_str(),
        ]))
        .check(Expr::col(TransactionColumn::Amount).gt(0));

    let user_index = Index::create()
        .if_not_exists()
        .name("idx_transactions_user_id")
        .table(Transaction)
        .col(TransactionColumn::UserId)
        .to_owned();

    db.execute(builder.build(&transaction_table)).await?;
    db.execute(builder.build(&user_index)).await?;

    Ok(())
}
