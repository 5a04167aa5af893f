//! Bot commands answered from the bot itself and the statistics store.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mbot_core::{Handler, HandlerResponse, Message, Result};
use std::fmt::Write;
use std::sync::Arc;
use storage::{ApiProvider, SenderCount, Stats, StatsRepository, StatsTarget};
use tracing::{info, instrument, warn};

use super::count_call;
use crate::components::BotComponents;
use crate::format::{format_uptime, senders_block};
use crate::middleware::storage_error;
use crate::VERSION;

pub const GROUP_ONLY: &str = "Эта команда доступна только в групповых чатах.";
pub const NO_CHAT_STATS: &str = "Статистика недоступна: в базе нет сообщений для этого чата.";
pub const CONTEXT_RESET: &str = "Контекст для AI сброшен. Начинаем с чистого листа!";

pub struct StartHandler;

#[async_trait]
impl Handler for StartHandler {
    async fn handle(&self, _message: &Message) -> Result<HandlerResponse> {
        Ok(HandlerResponse::Reply(format!(
            "Привет, я бот версии {}",
            VERSION
        )))
    }
}

pub struct VersionHandler;

#[async_trait]
impl Handler for VersionHandler {
    async fn handle(&self, _message: &Message) -> Result<HandlerResponse> {
        Ok(HandlerResponse::Reply(format!("Версия бота: {}", VERSION)))
    }
}

/// `/reset`: starts a new context generation; older records stop feeding the AI.
pub struct ResetHandler {
    repo: Arc<StatsRepository>,
}

impl ResetHandler {
    pub fn new(repo: Arc<StatsRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Handler for ResetHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let reset_id = self
            .repo
            .reset_context(message.chat.id)
            .await
            .map_err(storage_error)?;
        info!(reset_id, "Context reset");
        Ok(HandlerResponse::Reply(CONTEXT_RESET.to_string()))
    }
}

/// `/stats`: bot-wide totals, this chat and the caller.
pub struct StatsHandler {
    components: Arc<BotComponents>,
}

impl StatsHandler {
    pub fn new(components: Arc<BotComponents>) -> Self {
        Self { components }
    }
}

#[async_trait]
impl Handler for StatsHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let repo = &self.components.repo;
        let global = repo.global_stats().await.map_err(storage_error)?;
        let uptime = Utc::now() - self.components.started_at;

        let mut out = String::from("📊 Статистика бота:\n\n");
        let _ = writeln!(out, "⏱ Время работы: {}", format_uptime(uptime));
        let _ = writeln!(out, "💬 Чатов: {}", global.chats);
        let _ = writeln!(out, "👤 Пользователей: {}", global.users);
        let _ = writeln!(out, "✉️ Сообщений: {}", global.messages);
        let _ = writeln!(out, "🔌 Запросов к API: {}", global.api_calls);

        if let Some(Stats::Chat(chat)) = repo
            .get_stats(StatsTarget::Chat(message.chat.id))
            .await
            .map_err(storage_error)?
        {
            out.push_str("\nВ этом чате:\n");
            let _ = writeln!(out, "✉️ Сообщений: {}", chat.message_count);
            let _ = writeln!(out, "🔌 Запросов к API: {}", chat.api_call_count);
            let _ = writeln!(out, "👥 Участников: {}", chat.user_count);
        }

        let target = StatsTarget::User {
            chat_id: message.chat.id,
            user_id: message.user.id,
        };
        if let Some(Stats::User(user)) = repo.get_stats(target).await.map_err(storage_error)? {
            let _ = write!(
                out,
                "\nВы ({}): {} сообщений, {} запросов к API",
                user.display_name, user.message_count, user.api_call_count
            );
        }
        Ok(HandlerResponse::Reply(out.trim_end().to_string()))
    }
}

/// `/test`: health of the store and the weather and currency providers.
pub struct TestHandler {
    components: Arc<BotComponents>,
}

impl TestHandler {
    pub fn new(components: Arc<BotComponents>) -> Self {
        Self { components }
    }
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✅"
    } else {
        "❌"
    }
}

#[async_trait]
impl Handler for TestHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let c = &self.components;
        let db = c.repo.ping().await;
        if let Err(e) = &db {
            warn!(error = %e, "Database ping failed");
        }

        let weather_ok = match c.config.feeds.weather_cities.first() {
            Some(city) => {
                let result = c.weather.current(&city.query).await;
                if let Err(e) = &result {
                    warn!(error = %e, "Weather check failed");
                }
                count_call(&c.repo, message, ApiProvider::Weather).await?;
                result.is_ok()
            }
            None => false,
        };

        let rates = c.rates.usd_rates().await;
        if let Err(e) = &rates {
            warn!(error = %e, "Currency check failed");
        }
        count_call(&c.repo, message, ApiProvider::Currency).await?;

        Ok(HandlerResponse::Reply(format!(
            "🧪 Тест системы:\n\nБот: ✅\nБаза данных: {}\nAPI погоды: {}\nAPI валют: {}",
            mark(db.is_ok()),
            mark(weather_ok),
            mark(rates.is_ok())
        )))
    }
}

/// `/chatstats`: top senders of the last 24 hours, the last 30 days and all time.
pub struct ChatStatsHandler {
    repo: Arc<StatsRepository>,
}

impl ChatStatsHandler {
    pub fn new(repo: Arc<StatsRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Handler for ChatStatsHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if !message.chat.is_group() {
            return Ok(HandlerResponse::Reply(GROUP_ONLY.to_string()));
        }
        let chat_id = message.chat.id;
        let repo = &self.repo;

        let stored = repo
            .message_count_since(chat_id, None)
            .await
            .map_err(storage_error)?;
        if stored == 0 {
            return Ok(HandlerResponse::Reply(NO_CHAT_STATS.to_string()));
        }

        let now = Utc::now();
        let mut out = String::from("📊 Статистика чата\n\n");
        for (title, window, top) in [
            ("За последние 24 часа", Duration::hours(24), 5),
            ("За последние 30 дней", Duration::days(30), 5),
        ] {
            let since = Some(now - window);
            let total = repo
                .message_count_since(chat_id, since)
                .await
                .map_err(storage_error)?;
            let senders = repo
                .sender_counts(chat_id, since, top)
                .await
                .map_err(storage_error)?;
            out.push_str(&senders_block(title, total, &senders));
            out.push('\n');
        }

        // All-time numbers come from the counters, which outlive purged records.
        let members = repo.chat_members(chat_id, 10).await.map_err(storage_error)?;
        let total = match repo
            .get_stats(StatsTarget::Chat(chat_id))
            .await
            .map_err(storage_error)?
        {
            Some(Stats::Chat(chat)) => chat.message_count,
            _ => stored,
        };
        let senders: Vec<SenderCount> = members
            .into_iter()
            .map(|m| SenderCount {
                user_id: m.user_id,
                display_name: m.display_name,
                message_count: m.message_count,
            })
            .collect();
        out.push_str(&senders_block("За всё время", total, &senders));
        Ok(HandlerResponse::Reply(out.trim_end().to_string()))
    }
}

/// `/users_stat`: per-member message and API counters of the chat.
pub struct UsersStatHandler {
    repo: Arc<StatsRepository>,
}

impl UsersStatHandler {
    pub fn new(repo: Arc<StatsRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Handler for UsersStatHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let members = self
            .repo
            .chat_members(message.chat.id, 50)
            .await
            .map_err(storage_error)?;

        let mut out = String::from("👥 Статистика участников:\n\n");
        for (i, m) in members.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {}: {} сообщений, {} запросов к API",
                i + 1,
                m.display_name,
                m.message_count,
                m.api_call_count
            );
        }
        Ok(HandlerResponse::Reply(out.trim_end().to_string()))
    }
}
