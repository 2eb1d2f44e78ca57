//! Unified error types for `LedgerBuddy`.
//!
//! Validation problems are user-correctable and live in
//! [`ValidationError`](crate::core::validation::ValidationError); everything
//! here that is not a validation error is an infrastructure or startup failure.

use crate::core::validation::ValidationError;
use sea_orm::DbErr;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unparsable configuration at startup
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// The backing database could not be reached or failed the request
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        /// Underlying database error text
        message: String,
    },

    /// The database rejected a row because it broke a table constraint
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        /// Underlying database error text
        message: String,
    },

    /// User input was rejected before reaching the store
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Chat platform user id that does not fit the `user_id` column
    #[error("User id {0} is out of range for the ledger")]
    InvalidUserId(u64),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Whether this error came from the storage layer.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable { .. } | Self::ConstraintViolation { .. }
        )
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        let message = err.to_string();
        // SQLite and Postgres both mention the constraint in CHECK failures,
        // which `sql_err` does not classify.
        if err.sql_err().is_some() || message.to_lowercase().contains("constraint") {
            Self::ConstraintViolation { message }
        } else {
            Self::StorageUnavailable { message }
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
