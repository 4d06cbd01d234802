//! promobot CLI: run the Telegram bot or validate the handler registry.
//! Config from env and optional CLI args.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use dispatch::{Registry, RegistryBuilder};
use plugins::{Builtins, GroupEditor, GroupManager};
use promobot_core::init_tracing;
use promobot_telegram::{build_bot, BotConfig, TelegramTransport};
use storage::{
    init_schema, ChannelRepository, GroupRepository, ParticipantRepository,
    SqliteConversationStore, SqlitePoolManager,
};

#[derive(Parser)]
#[command(name = "promobot")]
#[command(about = "Promotion Group bot CLI: run, validate", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Build the handler registry against an in-memory database and print a
    /// summary. Exits non-zero when a plugin wiring rule is violated.
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => run(token).await,
        Commands::Validate => validate().await,
    }
}

/// Loads every plugin into a registry backed by the given database.
fn build_registry(pool_manager: &SqlitePoolManager) -> Result<Registry> {
    let groups = GroupRepository::new(pool_manager.clone());
    let channels = ChannelRepository::new(pool_manager.clone());
    let participants = ParticipantRepository::new(pool_manager.clone());

    RegistryBuilder::new()
        .load(Arc::new(Builtins))
        .load(Arc::new(GroupManager::new(groups.clone())))
        .load(Arc::new(GroupEditor::new(groups, channels, participants)))
        .build()
        .context("Failed to build handler registry")
}

async fn run(token: Option<String>) -> Result<()> {
    let config = BotConfig::load(token)?;
    init_tracing(config.log_file.as_deref())?;

    info!(database_url = %config.database_url, "Initializing bot");

    let pool_manager = SqlitePoolManager::new(&config.database_url)
        .await
        .context("Failed to open database")?;
    init_schema(&pool_manager)
        .await
        .context("Failed to initialize database schema")?;

    let store = Arc::new(SqliteConversationStore::new(pool_manager.clone()));
    let registry = build_registry(&pool_manager)?;

    let bot = build_bot(&config)?;
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let router = dispatch::Dispatcher::new(Arc::new(registry), store, transport);

    info!("Bot started successfully");

    promobot_telegram::run(bot, router).await
}

/// Builds the registry against a throwaway in-memory database and prints
/// what got wired. Registration mistakes (a menu nobody handles, a duplicate
/// handler name) surface here instead of at startup in production.
async fn validate() -> Result<()> {
    let pool_manager = SqlitePoolManager::new("sqlite::memory:")
        .await
        .context("Failed to open in-memory database")?;
    init_schema(&pool_manager)
        .await
        .context("Failed to initialize database schema")?;

    let registry = build_registry(&pool_manager)?;

    let menus: Vec<&str> = registry
        .declared_menus()
        .iter()
        .map(|m| m.as_str())
        .collect();

    println!("Registry OK");
    println!("  plugins:  {}", registry.plugins().join(", "));
    println!("  handlers: {}", registry.handler_count());
    println!("  menus:    {}", menus.join(", "));

    Ok(())
}
