//! Aggregate statistics returned by StatsRepository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Target of `get_stats`: a whole chat or one user within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsTarget {
    Chat(i64),
    User { chat_id: i64, user_id: i64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stats {
    Chat(ChatStats),
    User(UserStats),
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatStats {
    pub chat_id: i64,
    pub title: Option<String>,
    pub message_count: i64,
    pub api_call_count: i64,
    pub user_count: i64,
    pub reset_id: i64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub chat_id: i64,
    pub user_id: i64,
    pub display_name: String,
    pub message_count: i64,
    pub api_call_count: i64,
    pub providers: Vec<ProviderUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProviderUsage {
    pub provider: String,
    pub call_count: i64,
}

/// Per-chat counters of one member (all time).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberStats {
    pub user_id: i64,
    pub display_name: String,
    pub message_count: i64,
    pub api_call_count: i64,
}

/// Message count of one sender over a time window.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SenderCount {
    pub user_id: i64,
    pub display_name: String,
    pub message_count: i64,
}

/// Bot-wide totals across all chats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalStats {
    pub chats: i64,
    pub users: i64,
    pub messages: i64,
    pub api_calls: i64,
    pub stored_messages: i64,
}
