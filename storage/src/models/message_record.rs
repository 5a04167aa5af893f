//! Message record model for persistence.
//!
//! Maps to the `messages` table. Appended for every processed update; `reply` is attached
//! once the handler produced one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageRecord {
    pub id: i64,
    pub chat_id: i64,
    pub user_id: i64,
    /// Platform message id.
    pub message_id: String,
    pub text: String,
    pub reply: Option<String>,
    /// Context generation of the chat when the message was recorded.
    pub reset_id: i64,
    pub created_at: DateTime<Utc>,
}
