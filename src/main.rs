use dotenvy::dotenv;
use shuffle_buddy::{
    bot,
    config::{self, database},
    core::{command_store, permissions},
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Bot settings from config.toml (defaults when the file is absent)
    let settings = config::settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    info!(prefix = %settings.prefix, restricted = settings.restricted_mode, "Settings loaded");

    // 4. Database and schema
    if database::get_database_url().starts_with("sqlite://data/") {
        std::fs::create_dir_all("data")?;
    }
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Seed default commands and owner tiers
    let catalog = bot::commands::builtin_handlers();
    command_store::seed_default_commands(&db, catalog.defaults()).await?;
    let owners = config::owners::get_owner_ids();
    permissions::seed_owner_tiers(&db, &owners, settings.max_tier).await?;
    info!("{} bot owner(s) at tier {}", owners.len(), settings.max_tier);

    // 6. Run the bot; the token is read directly before use
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, settings, db, catalog).await
}
