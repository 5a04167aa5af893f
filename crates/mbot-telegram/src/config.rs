//! Minimal transport config: token and optional Bot API URL.
//! Loaded from BOT_TOKEN (or TELEGRAM_TOKEN) and TELEGRAM_API_URL (or TELOXIDE_API_URL).

use mbot_core::{BotError, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub telegram_api_url: Option<String>,
}

impl TelegramConfig {
    /// Loads from env; `token` overrides BOT_TOKEN when given.
    pub fn from_env(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => env::var("BOT_TOKEN")
                .or_else(|_| env::var("TELEGRAM_TOKEN"))
                .map_err(|_| BotError::Configuration("BOT_TOKEN not set".to_string()))?,
        };
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok()
            .filter(|s| !s.trim().is_empty());
        Ok(Self {
            bot_token,
            telegram_api_url,
        })
    }

    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            telegram_api_url: None,
        }
    }

    /// Builds the teloxide Bot, pointing it at `telegram_api_url` when set (mock servers in tests).
    pub fn build_bot(&self) -> Result<teloxide::Bot> {
        let bot = teloxide::Bot::new(self.bot_token.clone());
        match &self.telegram_api_url {
            Some(url_str) => {
                let url = reqwest::Url::parse(url_str).map_err(|e| {
                    BotError::Configuration(format!("Invalid TELEGRAM_API_URL {}: {}", url_str, e))
                })?;
                Ok(bot.set_api_url(url))
            }
            None => Ok(bot),
        }
    }
}
