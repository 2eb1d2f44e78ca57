use dotenvy::dotenv;
use ledger_buddy::{
    bot,
    config::{database, settings::AppConfig},
    core::ledger::Ledger,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file so RUST_LOG and the settings below can come from it
    dotenv().ok(); // Non-fatal, env vars can be set externally

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 3. Load configuration; a missing DISCORD_BOT_TOKEN stops here
    let app_config = AppConfig::from_env()
        .inspect_err(|e| error!("Critical error loading application configuration: {e}"))?;
    info!(config = ?app_config, "Loaded application configuration.");

    // 4. Open the pool and make sure the schema exists before accepting commands
    let db = database::create_connection(&app_config)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    let ledger = Ledger::initialize(db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    // 5. Run the bot
    bot::run_bot(app_config.bot_token, app_config.command_prefix, ledger).await
}
