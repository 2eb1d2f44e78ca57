//! General Discord commands - `start` and `help`.
//! Neither touches the database; both reply with the usage overview.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, reply_with},
        errors::Result,
    };

    /// Greets the user and lists the available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn start(ctx: Context<'_>) -> Result<()> {
        reply_with(ctx, "start", &[]).await
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: Context<'_>) -> Result<()> {
        reply_with(ctx, "help", &[]).await
    }
}

// Re-export all commands
pub use inner::*;
