//! Application settings read from environment variables (and `.env` via `dotenvy`).

use crate::{
    config::database,
    errors::{Error, Result},
};
use std::fmt;

/// Pool size used when `DB_MAX_CONNECTIONS` is not set.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Prefix for text commands such as `!income 100 food`.
pub const DEFAULT_COMMAND_PREFIX: &str = "!";

/// Everything the process needs before it can accept commands.
#[derive(Clone)]
pub struct AppConfig {
    /// SeaORM connection URL
    pub database_url: String,
    /// Upper bound on pooled database connections
    pub max_connections: u32,
    /// Discord bot token from `DISCORD_BOT_TOKEN`
    pub bot_token: String,
    /// Prefix for non-slash commands
    pub command_prefix: String,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// A missing or empty `DISCORD_BOT_TOKEN` is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("DISCORD_BOT_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| Error::Config {
                message: "DISCORD_BOT_TOKEN is not set".to_string(),
            })?;

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| Error::Config {
                    message: format!("DB_MAX_CONNECTIONS must be a positive integer, got '{raw}'"),
                })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let command_prefix = lookup("COMMAND_PREFIX")
            .filter(|prefix| !prefix.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COMMAND_PREFIX.to_string());

        let database_url = database::resolve_database_url(&lookup)?;

        Ok(Self {
            database_url,
            max_connections,
            bot_token,
            command_prefix,
        })
    }
}

// Keeps the token and database password out of logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let database = self
            .database_url
            .split_once("://")
            .map_or("<unknown>", |(scheme, _)| scheme);
        f.debug_struct("AppConfig")
            .field("database", &database)
            .field("max_connections", &self.max_connections)
            .field("bot_token", &"<redacted>")
            .field("command_prefix", &self.command_prefix)
            .finish()
    }
}
