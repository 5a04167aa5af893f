//! Wraps teloxide::Bot and implements [`mbot_core::Bot`]. Production code sends messages via
//! Telegram; tests substitute another Bot impl.

use async_trait::async_trait;
use mbot_core::{Bot as CoreBot, BotError, Chat, Message, Result};
use teloxide::{
    prelude::*,
    types::{ChatId, MessageId, ReplyParameters},
};
use tracing::debug;

/// Maximum text length of one Telegram message, in characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Thin wrapper around teloxide::Bot that implements mbot-core's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        for part in split_message(text, TELEGRAM_MESSAGE_LIMIT) {
            self.bot
                .send_message(ChatId(chat.id), part)
                .await
                .map_err(|e| BotError::Bot(e.to_string()))?;
        }
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        let reply_id: Option<i32> = message.id.parse().ok();
        let parts = split_message(text, TELEGRAM_MESSAGE_LIMIT);
        debug!(chat_id = message.chat.id, parts = parts.len(), "Sending reply");
        for (i, part) in parts.into_iter().enumerate() {
            let request = self.bot.send_message(ChatId(message.chat.id), part);
            // Only the first part is threaded to the original message.
            let request = match (i, reply_id) {
                (0, Some(id)) => request.reply_parameters(ReplyParameters::new(MessageId(id))),
                _ => request,
            };
            request.await.map_err(|e| BotError::Bot(e.to_string()))?;
        }
        Ok(())
    }
}

/// Splits `text` into chunks of at most `max_chars` characters, preferring line boundaries.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len <= max_chars {
            current.push_str(line);
            current_len += line_len;
            continue;
        }
        if !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len <= max_chars {
            current.push_str(line);
            current_len = line_len;
        } else {
            let chars: Vec<char> = line.chars().collect();
            for chunk in chars.chunks(max_chars) {
                parts.push(chunk.iter().collect());
            }
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
