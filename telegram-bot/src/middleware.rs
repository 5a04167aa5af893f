//! Statistics middleware: counts and records every routed message before its handler runs,
//! then attaches the reply to the stored record.

use async_trait::async_trait;
use mbot_core::{BotError, HandlerResponse, Message, Middleware, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use storage::{ChatInfo, StatsRepository, StorageError, UserInfo};
use tracing::{debug, instrument};

pub fn chat_info(message: &Message) -> ChatInfo {
    ChatInfo::new(message.chat.id, message.chat.title.clone())
}

pub fn user_info(message: &Message) -> UserInfo {
    UserInfo::new(
        message.user.id,
        message.user.display_name(),
        message.user.username.clone(),
    )
}

pub fn storage_error(e: StorageError) -> BotError {
    BotError::Storage(e.to_string())
}

pub struct StatsMiddleware {
    repo: Arc<StatsRepository>,
    /// (chat id, message id) → record id, between before and after.
    pending: Mutex<HashMap<(i64, String), i64>>,
}

impl StatsMiddleware {
    pub fn new(repo: Arc<StatsRepository>) -> Self {
        Self {
            repo,
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, HashMap<(i64, String), i64>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Middleware for StatsMiddleware {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id, user_id = message.user.id))]
    async fn before(&self, message: &Message) -> Result<bool> {
        let record_id = self
            .repo
            .record_message(
                &chat_info(message),
                &user_info(message),
                &message.id,
                &message.content,
                None,
            )
            .await
            .map_err(storage_error)?;
        debug!(record_id, "Message recorded");
        self.pending()
            .insert((message.chat.id, message.id.clone()), record_id);
        Ok(true)
    }

    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        let record_id = self.pending().remove(&(message.chat.id, message.id.clone()));
        if let (Some(record_id), Some(reply)) = (record_id, response.reply_text()) {
            self.repo
                .attach_reply(record_id, reply)
                .await
                .map_err(storage_error)?;
        }
        Ok(())
    }
}
