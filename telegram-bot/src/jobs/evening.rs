use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use mbot_core::Chat;
use scheduler::Job;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::components::BotComponents;
use crate::format::format_uptime;

/// "📊 Статистика за день:" with uptime and the messages of the last 24 hours.
pub fn evening_report(uptime: Duration, messages_today: i64) -> String {
    format!(
        "📊 Статистика за день:\n\n⏱ Время работы: {}\n✉️ Сообщений за сутки: {}",
        format_uptime(uptime),
        messages_today
    )
}

pub struct EveningStatsJob {
    components: Arc<BotComponents>,
}

impl EveningStatsJob {
    pub fn new(components: Arc<BotComponents>) -> Self {
        Self { components }
    }
}

#[async_trait]
impl Job for EveningStatsJob {
    #[instrument(skip(self), fields(job = "evening_stats"))]
    async fn run(&self) -> Result<()> {
        let c = &self.components;
        let target = c.config.chats.target_chat_id;
        let now = Utc::now();
        let messages = c
            .repo
            .message_count_since(target, Some(now - Duration::hours(24)))
            .await
            .context("Failed to count today's messages")?;

        c.bot
            .send_message(
                &Chat::with_id(target),
                &evening_report(now - c.started_at, messages),
            )
            .await
            .context("Failed to send evening statistics")?;
        info!(chat_id = target, messages, "Evening statistics sent");
        Ok(())
    }
}
