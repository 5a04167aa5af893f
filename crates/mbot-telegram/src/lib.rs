//! # mbot-telegram
//!
//! Telegram transport layer: adapters to core types, [`TelegramBotAdapter`] implementing
//! `mbot_core::Bot`, minimal config and the receive loop. No statistics, AI or scheduling logic.

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::{split_message, TelegramBotAdapter, TELEGRAM_MESSAGE_LIMIT};
pub use config::TelegramConfig;
pub use runner::{fetch_bot_identity, run_repl};
