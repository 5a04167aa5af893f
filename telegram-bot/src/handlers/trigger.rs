//! Canned replies to configured trigger phrases; no AI call.

use async_trait::async_trait;
use composer::{ResponseComposer, TriggerKind};
use mbot_core::{Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::debug;

pub struct TriggerHandler {
    composer: Arc<ResponseComposer>,
}

impl TriggerHandler {
    pub fn new(composer: Arc<ResponseComposer>) -> Self {
        Self { composer }
    }
}

#[async_trait]
impl Handler for TriggerHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let phrase = message.content.trim().to_lowercase();
        debug!(chat_id = message.chat.id, phrase = %phrase, "Trigger phrase matched");
        let reply = self.composer.pick(&TriggerKind::Phrase(phrase));
        Ok(HandlerResponse::Reply(reply))
    }
}
