//! Ledger Discord commands - `income`, `expense`, and `balance`.
//!
//! The amount is taken as raw text and the category as the rest of the
//! message, so all parsing and validation happens in the core validator.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, reply_with, tokenize},
        errors::Result,
    };

    /// Records income, e.g. `/income 1000 salary`.
    #[poise::command(slash_command, prefix_command)]
    pub async fn income(
        ctx: Context<'_>,
        #[description = "Amount, e.g. 1000 or 12.50"] amount: Option<String>,
        #[description = "Optional category"]
        #[rest]
        category: Option<String>,
    ) -> Result<()> {
        let args = tokenize(&[amount.as_deref(), category.as_deref()]);
        reply_with(ctx, "income", &args).await
    }

    /// Records an expense, e.g. `/expense 300 groceries`.
    #[poise::command(slash_command, prefix_command)]
    pub async fn expense(
        ctx: Context<'_>,
        #[description = "Amount, e.g. 300 or 4.99"] amount: Option<String>,
        #[description = "Optional category"]
        #[rest]
        category: Option<String>,
    ) -> Result<()> {
        let args = tokenize(&[amount.as_deref(), category.as_deref()]);
        reply_with(ctx, "expense", &args).await
    }

    /// Shows income, expense, and net balance.
    #[poise::command(slash_command, prefix_command)]
    pub async fn balance(ctx: Context<'_>) -> Result<()> {
        reply_with(ctx, "balance", &[]).await
    }
}

// Re-export all commands
pub use inner::*;
