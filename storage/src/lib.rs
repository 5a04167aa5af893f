//! Storage crate: statistics and message history for the bot.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – MessageRecord, ChatInfo/UserInfo, stats rows
//! - [`stats_repo`] – StatsRepository (SQLite)
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod models;
mod sqlite_pool;
mod stats_repo;

pub use error::StorageError;
pub use models::{
    ApiProvider, ChatInfo, ChatStats, GlobalStats, MemberStats, MessageRecord, ProviderUsage, SenderCount,
    Stats, StatsTarget, UserInfo, UserStats,
};
pub use sqlite_pool::SqlitePoolManager;
pub use stats_repo::StatsRepository;
