//! Runtime configuration loaded from the environment.

use anyhow::{Context, Result};
use std::env;

/// Bot process configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub database_url: String,
    /// Optional log file. Logs go to stdout only when unset.
    pub log_file: Option<String>,
    /// Optional Telegram Bot API base URL. When set, requests go there
    /// instead of api.telegram.org (used to point at a mock server).
    /// Env: `TELEGRAM_API_URL` or `TELOXIDE_API_URL`.
    pub telegram_api_url: Option<String>,
}

impl BotConfig {
    /// Loads configuration from environment variables.
    /// A token passed in takes precedence over `BOT_TOKEN`.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN").context("BOT_TOKEN not set")?,
        };
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:promobot.db".to_string());
        let log_file = env::var("LOG_FILE").ok();
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();

        Ok(Self {
            bot_token,
            database_url,
            log_file,
            telegram_api_url,
        })
    }
}
