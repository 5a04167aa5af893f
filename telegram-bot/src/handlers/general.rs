use async_trait::async_trait;
use mbot_core::{Handler, HandlerResponse, Message, Result};

/// Plain messages in allow-listed chats: recorded by the stats middleware, no reply.
pub struct GeneralHandler;

#[async_trait]
impl Handler for GeneralHandler {
    async fn handle(&self, _message: &Message) -> Result<HandlerResponse> {
        Ok(HandlerResponse::Stop)
    }
}
