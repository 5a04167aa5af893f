//! Bot configuration: BaseConfig (Telegram + log + DB), AI settings from llm-client, and the
//! application sections (chats, feeds, schedule, replies). Everything comes from the environment.

mod base;
mod bot_config;
mod env;
mod sections;

#[cfg(test)]
mod tests;

pub use base::BaseConfig;
pub use bot_config::BotConfig;
pub use sections::{City, ChatsConfig, FeedsConfig, RepliesConfig, ScheduleConfig};
