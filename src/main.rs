//! Group Config Bot - Main Entry Point
//!
//! A Telegram bot that lets users configure per-group limits, blacklists
//! and the bot's activation window through inline menus.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use group_config_bot::config::{BotConfig, BotSettings, TelegramConfig};
use group_config_bot::conversation::Conversation;
use group_config_bot::repo::{InMemoryUserRepository, JsonFileUserRepository, UserRepository};
use group_config_bot::store::{GroupStore, JanitorMessage, SessionJanitor};
use group_config_bot::telegram::{self, Bot};

/// Telegram bot for group trading configuration.
#[derive(Parser, Debug)]
#[command(name = "config_bot")]
#[command(about = "Configure group limits, blacklists and activation time via Telegram")]
#[command(version)]
struct Args {
    /// Path to the groups JSON seed file. Two default groups when omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Generate an example configuration file and exit.
    #[arg(long)]
    generate_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Handle example config generation
    if args.generate_config {
        return generate_example_config();
    }

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load configurations
    let tg_config = TelegramConfig::from_env()
        .context("Failed to load Telegram configuration from environment")?;

    let bot_settings = BotSettings::from_env_with_defaults();

    let bot_config = match &args.config {
        Some(path) => BotConfig::load_from_file(path)
            .with_context(|| format!("Failed to load group configuration from {path}"))?,
        None => BotConfig::default(),
    };

    bot_config
        .validate()
        .context("Group configuration validation failed")?;

    info!(
        "Loaded {} groups (activation window: {})",
        bot_config.len(),
        bot_config.time_window
    );

    let users = open_repository(bot_settings.users_db_path.as_deref()).await?;

    let conversation = Arc::new(Conversation::new(
        GroupStore::new(bot_config.groups),
        bot_config.time_window,
        users,
    ));

    // Spawn the idle-session janitor
    let (janitor_tx, janitor_rx) = mpsc::channel::<JanitorMessage>(8);
    let janitor_handle = if bot_settings.prunes_sessions() {
        let janitor = SessionJanitor::new(
            Arc::clone(conversation.sessions()),
            Duration::from_secs(bot_settings.session_idle_timeout_secs),
        )
        .with_check_interval(Duration::from_secs(bot_settings.janitor_interval_secs));

        Some(tokio::spawn(async move {
            janitor.run(janitor_rx).await;
        }))
    } else {
        info!("Idle session pruning disabled");
        None
    };

    info!("Starting group config bot...");
    info!("Bot is running. Use Ctrl+C to stop.");

    let bot = Bot::new(tg_config.bot_token);
    telegram::run(bot, conversation).await;

    // Cleanup
    info!("Shutting down...");
    if let Some(handle) = janitor_handle {
        let _ = janitor_tx.send(JanitorMessage::Shutdown).await;
        let _ = handle.await;
    }

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Opens the user store named by the settings, or an in-memory one.
async fn open_repository(path: Option<&Path>) -> Result<Arc<dyn UserRepository>> {
    match path {
        Some(path) => {
            let repo = JsonFileUserRepository::open(path)
                .await
                .with_context(|| format!("Failed to open user store at {}", path.display()))?;
            info!("User records stored in {}", repo.path().display());
            Ok(Arc::new(repo))
        }
        None => {
            info!("USERS_DB_PATH not set, user records kept in memory");
            Ok(Arc::new(InMemoryUserRepository::new()))
        }
    }
}

/// Generates an example configuration file.
fn generate_example_config() -> Result<()> {
    let example = BotConfig::example();
    example.save_to_file("groups.example.json")?;

    println!("✓ Example configuration written to: groups.example.json");
    println!("\nTo use this bot:");
    println!("1. Copy groups.example.json to groups.json");
    println!("2. Edit the groups, limits and blacklists");
    println!("3. Create a .env file with TG_BOT_TOKEN");
    println!("4. Run: config_bot --config groups.json");

    Ok(())
}
