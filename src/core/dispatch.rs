//! Command dispatch - maps chat commands onto validation, the ledger, and
//! balance aggregation, and renders the outcome as reply text.
//!
//! Each command is handled on its own. Nothing is shared between commands
//! apart from the ledger's connection pool.

use crate::{
    core::{
        amount,
        balance::Balance,
        ledger::{Ledger, UserId},
        validation::{ParsedEntry, ValidationError, validate},
    },
    entities::TransactionKind,
    errors::Error,
};
use std::fmt;
use tracing::{debug, error, info};

/// The closed set of commands the bot understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Greeting and usage overview
    Start,
    /// Record an income or expense; `args` is `<amount> [category...]`
    Record {
        /// Direction of the entry
        kind: TransactionKind,
        /// Whitespace-separated tokens after the command name
        args: Vec<String>,
    },
    /// Report the running balance
    Balance,
}

impl Command {
    /// Maps a command name and its argument tokens to a [`Command`].
    ///
    /// Names are matched case-insensitively and may carry a leading `/`.
    /// `start` and `balance` ignore any arguments.
    pub fn parse<S: AsRef<str>>(name: &str, args: &[S]) -> Option<Self> {
        let name = name.trim().trim_start_matches('/').to_lowercase();
        let record = |kind| Self::Record {
            kind,
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
        };

        match name.as_str() {
            "start" | "help" => Some(Self::Start),
            "income" => Some(record(TransactionKind::Income)),
            "expense" => Some(record(TransactionKind::Expense)),
            "balance" => Some(Self::Balance),
            _ => None,
        }
    }
}

/// Outcome of one command, rendered to the user through `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Answer to `start`
    Greeting,
    /// An entry was appended
    Recorded {
        /// Direction of the entry
        kind: TransactionKind,
        /// Id assigned by the ledger
        id: i64,
        /// What was stored
        entry: ParsedEntry,
    },
    /// Answer to `balance`
    Balance(Balance),
    /// Input was rejected before touching the ledger
    Rejected {
        /// Command that was rejected
        kind: TransactionKind,
        /// Why
        error: ValidationError,
    },
    /// The ledger failed; the user may try again
    Failed,
    /// Name that is not one of the known commands
    UnknownCommand(String),
}

/// Typed command handler: parses `name`/`args` and executes the command.
pub async fn respond<S: AsRef<str>>(
    ledger: &Ledger,
    user_id: UserId,
    name: &str,
    args: &[S],
) -> Response {
    match Command::parse(name, args) {
        Some(command) => execute(ledger, user_id, command).await,
        None => Response::UnknownCommand(name.to_string()),
    }
}

/// Runs an already parsed command for `user_id`.
///
/// Storage errors are logged here and collapse into [`Response::Failed`];
/// they never propagate to the caller.
pub async fn execute(ledger: &Ledger, user_id: UserId, command: Command) -> Response {
    match command {
        Command::Start => Response::Greeting,
        Command::Record { kind, args } => record(ledger, user_id, kind, &args).await,
        Command::Balance => show_balance(ledger, user_id).await,
    }
}

async fn record(ledger: &Ledger, user_id: UserId, kind: TransactionKind, args: &[String]) -> Response {
    let entry = match args.split_first() {
        Some((raw_amount, category_tokens)) => validate(raw_amount, category_tokens),
        None => Err(ValidationError::MissingAmount),
    };

    let entry = match entry {
        Ok(entry) => entry,
        Err(error) => {
            debug!(user_id, kind = kind.as_str(), %error, "Rejected entry");
            return Response::Rejected { kind, error };
        }
    };

    match ledger
        .append(user_id, entry.amount, &entry.category, kind)
        .await
    {
        Ok(id) => {
            info!(user_id, id, kind = kind.as_str(), "Recorded entry");
            Response::Recorded { kind, id, entry }
        }
        Err(err) => storage_failure(kind.as_str(), user_id, &err),
    }
}

async fn show_balance(ledger: &Ledger, user_id: UserId) -> Response {
    match ledger.aggregate(user_id).await {
        Ok(totals) => Response::Balance(Balance::from(totals)),
        Err(err) => storage_failure("balance", user_id, &err),
    }
}

fn storage_failure(command: &str, user_id: UserId, err: &Error) -> Response {
    error!(command, user_id, error = %err, "Ledger operation failed");
    Response::Failed
}

const GREETING: &str = "👋 Hi! I can help you keep track of your income and expenses.\n\n\
    Try these commands:\n\
    /income 1000 salary - record income\n\
    /expense 300 groceries - record an expense\n\
    /balance - show your balance";

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Greeting => f.write_str(GREETING),
            Self::Recorded { kind, entry, .. } => write!(
                f,
                "✅ Added {}: {} ({})",
                kind.as_str(),
                amount::format(entry.amount),
                entry.category
            ),
            Self::Balance(balance) => write!(f, "📊 Your balance:\n{balance}"),
            Self::Rejected {
                kind,
                error: ValidationError::MissingAmount,
            } => write!(
                f,
                "❌ Provide an amount and, optionally, a category.\nExample: /{} 5000 salary",
                kind.as_str()
            ),
            Self::Rejected { error, .. } => write!(f, "❌ Error: {error}"),
            Self::Failed => f.write_str(
                "⚠️ Something went wrong while talking to the ledger. Please try again later.",
            ),
            Self::UnknownCommand(name) => write!(
                f,
                "❓ Unknown command '{name}'. Use /start to see what I can do."
            ),
        }
    }
}
