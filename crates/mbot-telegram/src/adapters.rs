//! Adapters from Telegram (teloxide) types to mbot_core types.

use mbot_core::{Chat, Message, ToCoreMessage, ToCoreUser, User};
use teloxide::types::UserId;

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Wraps a teloxide Message for conversion to core [`Message`].
///
/// `bot_id` is our own user id from `getMe`; a reply counts as addressed to the bot only when
/// the replied-to message was sent by that id. Without it no reply is attributed to the bot.
pub struct TelegramMessageWrapper<'a> {
    message: &'a teloxide::types::Message,
    bot_id: Option<UserId>,
}

impl<'a> TelegramMessageWrapper<'a> {
    pub fn new(message: &'a teloxide::types::Message, bot_id: Option<UserId>) -> Self {
        Self { message, bot_id }
    }
}

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        Message {
            id: self.message.id.to_string(),
            user: self
                .message
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or_else(|| User {
                    id: 0,
                    username: None,
                    first_name: None,
                    last_name: None,
                }),
            chat: Chat {
                id: self.message.chat.id.0,
                chat_type: self.chat_type().to_string(),
                title: self.message.chat.title().map(str::to_string),
            },
            content: self.message.text().unwrap_or("").to_string(),
            created_at: self.message.date,
            reply_to_message_id: self.message.reply_to_message().map(|m| m.id.to_string()),
            reply_to_message_from_bot: self.reply_to_message_from_bot(),
            reply_to_message_content: self
                .message
                .reply_to_message()
                .and_then(|m| m.text())
                .map(str::to_string),
        }
    }
}

impl<'a> TelegramMessageWrapper<'a> {
    fn chat_type(&self) -> &'static str {
        let chat = &self.message.chat;
        if chat.is_private() {
            "private"
        } else if chat.is_supergroup() {
            "supergroup"
        } else if chat.is_group() {
            "group"
        } else {
            "channel"
        }
    }

    fn reply_to_message_from_bot(&self) -> bool {
        let Some(bot_id) = self.bot_id else {
            return false;
        };
        self.message
            .reply_to_message()
            .and_then(|m| m.from.as_ref())
            .is_some_and(|u| u.id == bot_id)
    }
}
