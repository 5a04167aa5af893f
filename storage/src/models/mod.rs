mod identity;
mod message_record;
mod stats;

pub use identity::{ApiProvider, ChatInfo, UserInfo};
pub use message_record::MessageRecord;
pub use stats::{
    ChatStats, GlobalStats, MemberStats, ProviderUsage, SenderCount, Stats, StatsTarget, UserStats,
};
