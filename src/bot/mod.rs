//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for `LedgerBuddy`: the poise
//! framework setup, error handling, and the commands that forward to
//! [`crate::core::dispatch`].

/// Discord command implementations (general, ledger)
pub mod commands;

use crate::{
    core::{dispatch, ledger::Ledger},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Ledger store; cloned connection pool, no per-command state
    pub ledger: Ledger,
}

impl BotData {
    /// Creates a new `BotData` instance around an initialized ledger.
    #[must_use]
    pub const fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }
}

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Runs one ledger command for the invoking user and sends the reply.
///
/// `args` are the whitespace-separated tokens the user typed after the
/// command name.
pub async fn reply_with(ctx: Context<'_>, name: &str, args: &[String]) -> Result<()> {
    let author = ctx.author().id.get();
    let user_id = i64::try_from(author).map_err(|_| Error::InvalidUserId(author))?;

    let response = dispatch::respond(&ctx.data().ledger, user_id, name, args).await;
    ctx.say(response.to_string()).await?;
    Ok(())
}

/// Splits optional free-text command fields into argument tokens.
#[must_use]
pub fn tokenize(fields: &[Option<&str>]) -> Vec<String> {
    fields
        .iter()
        .flatten()
        .flat_map(|field| field.split_whitespace())
        .map(str::to_string)
        .collect()
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error}", ctx.command().name);
            if let Err(e) = ctx
                .say("⚠️ Something went wrong while handling that command.")
                .await
            {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Connects to Discord and serves commands until the client stops.
#[instrument(skip(token, ledger))]
pub async fn run_bot(token: String, command_prefix: String, ledger: Ledger) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::start(),
                commands::help(),
                commands::income(),
                commands::expense(),
                commands::balance(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(command_prefix),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(ledger))
            })
        })
        .build();

    // Message content is needed for prefix commands
    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e}"))?;

    info!("✅ Bot started");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e}"))?;
    Ok(())
}
