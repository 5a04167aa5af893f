//! Route handlers: bot commands, feed commands, AI mention replies, trigger phrases and the
//! record-only general handler.

mod ai;
mod commands;
mod feeds;
mod general;
mod trigger;

pub use ai::MentionHandler;
pub use commands::{
    ChatStatsHandler, ResetHandler, StartHandler, StatsHandler, TestHandler, UsersStatHandler,
    VersionHandler, CONTEXT_RESET, GROUP_ONLY, NO_CHAT_STATS,
};
pub use feeds::{
    CryptoHandler, RatesHandler, RatesPair, WeatherHandler, RATES_UNAVAILABLE, WLD_UNAVAILABLE,
};
pub use general::GeneralHandler;
pub use trigger::TriggerHandler;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use mbot_core::{Message, Result};
use storage::{ApiProvider, StatsRepository};

use crate::middleware::{chat_info, storage_error, user_info};

/// Counts one provider call on behalf of the sender of `message`.
pub(crate) async fn count_call(
    repo: &StatsRepository,
    message: &Message,
    provider: ApiProvider,
) -> Result<()> {
    repo.increment_api_usage(&chat_info(message), &user_info(message), provider)
        .await
        .map_err(storage_error)
}

pub(crate) fn local_now(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}
