//! Morning message: weather for several cities, exchange rates, crypto prices and an AI wish.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use mbot_core::Chat;
use scheduler::Job;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::notify_admin;
use crate::components::BotComponents;
use crate::format::MorningReport;

pub const MORNING_SENT: &str = "✅ Утреннее сообщение успешно отправлено в чат";

/// Collects the report. Provider failures leave gaps that render as "no data".
pub async fn build_morning_report(components: &BotComponents) -> MorningReport {
    let c = components;
    let mut weather = Vec::with_capacity(c.config.feeds.morning_cities.len());
    for city in &c.config.feeds.morning_cities {
        match c.weather.current(&city.query).await {
            Ok(w) => weather.push((city.label.clone(), Some(w))),
            Err(e) => {
                warn!(city = %city.query, error = %e, "Morning weather lookup failed");
                weather.push((city.label.clone(), None));
            }
        }
    }

    let (rates, crypto) = tokio::join!(c.rates.usd_rates(), c.crypto.prices());
    let rates = rates
        .map_err(|e| warn!(error = %e, "Morning rates lookup failed"))
        .ok();
    let crypto = crypto
        .map_err(|e| warn!(error = %e, "Morning crypto lookup failed"))
        .ok();

    let weekday = Utc::now()
        .with_timezone(&c.config.schedule.timezone)
        .weekday();
    let wish = c.composer.compose_greeting(weekday).await;

    MorningReport {
        weather,
        rates,
        crypto,
        wish: wish.text,
    }
}

/// A second run within this window after a sent digest is skipped.
pub const MORNING_DEDUP_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Posts the morning digest. One instance backs both the cron and the startup entry; its guard
/// keeps them from running together or posting twice in a row.
pub struct MorningJob {
    components: Arc<BotComponents>,
    last_sent: Mutex<Option<DateTime<Utc>>>,
}

impl MorningJob {
    pub fn new(components: Arc<BotComponents>) -> Self {
        Self {
            components,
            last_sent: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Job for MorningJob {
    #[instrument(skip(self), fields(job = "morning"))]
    async fn run(&self) -> Result<()> {
        let Ok(mut last_sent) = self.last_sent.try_lock() else {
            info!("Morning message already in progress, skipping");
            return Ok(());
        };
        let now = Utc::now();
        if let Some(at) = *last_sent {
            if (now - at).to_std().is_ok_and(|elapsed| elapsed < MORNING_DEDUP_WINDOW) {
                info!(last_sent = %at, "Morning message sent recently, skipping");
                return Ok(());
            }
        }

        let c = &self.components;
        let target = c.config.chats.target_chat_id;
        let text = build_morning_report(c).await.render();

        c.bot
            .send_message(&Chat::with_id(target), &text)
            .await
            .with_context(|| format!("Failed to send morning message to {}", target))?;
        *last_sent = Some(now);
        info!(chat_id = target, "Morning message sent");
        notify_admin(c, MORNING_SENT).await;
        Ok(())
    }
}
