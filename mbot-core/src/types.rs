//! Core types: user, chat, message, handler response, and the Handler / Middleware traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User identity (id, username, names).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// Human-readable name: "First Last", else "@username", else "User {id}".
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        match &self.username {
            Some(u) if !u.is_empty() => format!("@{}", u),
            _ => format!("User {}", self.id),
        }
    }
}

/// Chat identity. `chat_type` is one of "private", "group", "supergroup", "channel".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub chat_type: String,
    pub title: Option<String>,
}

impl Chat {
    /// A chat known only by id (scheduled jobs sending to a configured chat).
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            chat_type: "unknown".to_string(),
            title: None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.chat_type.as_str(), "group" | "supergroup")
    }
}

/// A single incoming message with user, chat, content, and optional reply context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub reply_to_message_id: Option<String>,
    /// Whether the replied-to message was sent by the bot; only meaningful when `reply_to_message_id` is set.
    pub reply_to_message_from_bot: bool,
    /// Text of the replied-to message; passed to the AI so it knows what the user answers to.
    pub reply_to_message_content: Option<String>,
}

/// Handler result. `Reply(text)` carries the response body so middleware can record it in `after()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Handled, nothing to send.
    Stop,
    /// Not handled (no route matched or handler declined).
    Ignore,
    /// Handled; send this text as a reply.
    Reply(String),
}

impl HandlerResponse {
    pub fn reply_text(&self) -> Option<&str> {
        match self {
            HandlerResponse::Reply(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Converts a transport-specific user type to core [`User`].
pub trait ToCoreUser: Send + Sync {
    fn to_core(&self) -> User;
}

/// Converts a transport-specific message type to core [`Message`].
pub trait ToCoreMessage: Send + Sync {
    fn to_core(&self) -> Message;
}

/// A routed handler: exactly one runs per dispatched update.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, message: &Message) -> crate::error::Result<HandlerResponse>;
}

/// Cross-cutting step around the selected handler. `before` runs in registration order,
/// `after` in reverse order with the handler's response.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Return false to stop processing; the handler is not invoked.
    async fn before(&self, _message: &Message) -> crate::error::Result<bool> {
        Ok(true)
    }

    async fn after(
        &self,
        _message: &Message,
        _response: &HandlerResponse,
    ) -> crate::error::Result<()> {
        Ok(())
    }
}
