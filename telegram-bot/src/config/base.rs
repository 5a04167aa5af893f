//! Base config: Telegram Bot connection, logging, database. Loaded from env.

use mbot_core::Result;
use mbot_telegram::TelegramConfig;

use super::env::var;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/bot.db";
pub const DEFAULT_LOG_FILE: &str = "logs/telegram-bot.log";

/// Base config: Telegram-related, logging, database only.
#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// BOT_TOKEN (or TELEGRAM_TOKEN) and TELEGRAM_API_URL
    pub telegram: TelegramConfig,
    /// LOG_FILE
    pub log_file: String,
    /// DATABASE_URL (SQLite)
    pub database_url: String,
}

impl BaseConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let telegram = TelegramConfig::from_env(token)?;
        let database_url = var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let log_file = var("LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

        Ok(Self {
            telegram,
            log_file,
            database_url,
        })
    }

    /// Validate config (e.g. telegram_api_url must be a valid URL if set).
    pub fn validate(&self) -> Result<()> {
        self.telegram.build_bot().map(|_| ())
    }
}
