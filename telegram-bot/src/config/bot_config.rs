//! BotConfig: BaseConfig + AI settings + application sections. Use load() for env-based loading.

use llm_client::LlmSettings;
use mbot_core::{BotError, Result};

use super::{BaseConfig, ChatsConfig, FeedsConfig, RepliesConfig, ScheduleConfig};

/// Full bot config, passed down explicitly as one struct.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub base: BaseConfig,
    pub ai: LlmSettings,
    pub chats: ChatsConfig,
    pub feeds: FeedsConfig,
    pub schedule: ScheduleConfig,
    pub replies: RepliesConfig,
}

impl BotConfig {
    /// Load full config from environment variables. If `token` is provided it overrides BOT_TOKEN.
    pub fn load(token: Option<String>) -> Result<Self> {
        let base = BaseConfig::load(token)?;
        let ai = LlmSettings::from_env().map_err(|e| BotError::Configuration(format!("{:#}", e)))?;
        Ok(Self {
            base,
            ai,
            chats: ChatsConfig::from_env()?,
            feeds: FeedsConfig::from_env()?,
            schedule: ScheduleConfig::from_env()?,
            replies: RepliesConfig::from_env()?,
        })
    }

    /// Validate config. Call after load() to fail fast before init.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()
    }

    pub fn bot_token(&self) -> &str {
        &self.base.telegram.bot_token
    }
    pub fn database_url(&self) -> &str {
        &self.base.database_url
    }
    pub fn log_file(&self) -> &str {
        &self.base.log_file
    }
    pub fn telegram_api_url(&self) -> Option<&str> {
        self.base.telegram.telegram_api_url.as_deref()
    }
}
