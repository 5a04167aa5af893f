//! Identity rows passed to the repository: who wrote, where, and which provider was called.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInfo {
    pub chat_id: i64,
    pub title: Option<String>,
}

impl ChatInfo {
    pub fn new(chat_id: i64, title: Option<String>) -> Self {
        Self { chat_id, title }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub display_name: String,
    pub username: Option<String>,
}

impl UserInfo {
    pub fn new(user_id: i64, display_name: impl Into<String>, username: Option<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            username,
        }
    }
}

/// External providers whose calls are counted per chat and user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiProvider {
    Ai,
    Weather,
    Currency,
    Crypto,
}

impl ApiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiProvider::Ai => "ai",
            ApiProvider::Weather => "weather",
            ApiProvider::Currency => "currency",
            ApiProvider::Crypto => "crypto",
        }
    }
}

impl fmt::Display for ApiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
