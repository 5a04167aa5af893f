use thiserror::Error;

/// Error taxonomy shared by every crate of the bot.
///
/// `ProviderUnavailable` is recovered locally (fallback reply or "no data" text), `Storage` aborts
/// the current update only, `Configuration` is fatal at startup.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("{provider} unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    pub fn provider(provider: impl Into<String>, reason: impl ToString) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
