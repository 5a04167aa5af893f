//! AI replies when the bot is mentioned or replied to.

use async_trait::async_trait;
use composer::{ReplySource, TriggerKind};
use dispatcher::extract_question;
use mbot_core::{Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use storage::ApiProvider;
use tracing::{info, instrument};

use super::count_call;
use crate::components::BotComponents;
use crate::middleware::storage_error;

pub struct MentionHandler {
    components: Arc<BotComponents>,
}

impl MentionHandler {
    pub fn new(components: Arc<BotComponents>) -> Self {
        Self { components }
    }
}

#[async_trait]
impl Handler for MentionHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id, user_id = message.user.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let c = &self.components;
        let username = c.bot_username.read().await.clone().unwrap_or_default();
        let question = if username.is_empty() {
            message.content.trim().to_string()
        } else {
            extract_question(&message.content, &username)
        };

        if question.is_empty() {
            return Ok(HandlerResponse::Reply(c.composer.pick(&TriggerKind::Mention)));
        }

        // The current message is already stored by the stats middleware.
        let limit = c.config.replies.history_limit.max(0);
        let recent: Vec<_> = c
            .repo
            .get_recent(message.chat.id, limit + 1)
            .await
            .map_err(storage_error)?
            .into_iter()
            .filter(|r| r.message_id != message.id)
            .collect();
        let skip = recent.len().saturating_sub(limit as usize);

        let reply_context = message
            .reply_to_message_content
            .as_deref()
            .filter(|_| message.reply_to_message_from_bot);

        let reply = c
            .composer
            .compose_reply(&question, &recent[skip..], reply_context, &TriggerKind::Mention)
            .await;
        count_call(&c.repo, message, ApiProvider::Ai).await?;

        info!(
            context = recent.len() - skip,
            from_ai = (reply.source == ReplySource::Ai),
            "Mention answered"
        );
        Ok(HandlerResponse::Reply(reply.text))
    }
}
