//! Shared fixtures: recording bot, scripted LLM, in-process feeds and components on an
//! in-memory database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use composer::{Persona, PhrasePool, ResponseComposer};
use feeds::{
    CryptoPrices, CryptoProvider, ProviderError, ProviderResult, RatesProvider, UsdRates, Weather,
    WeatherProvider,
};
use llm_client::{CompletionParams, LlmClient, LlmSettings};
use mbot_core::{Bot, Chat, Message, User};
use mbot_telegram::TelegramConfig;
use prompt::ChatMessage;
use storage::StatsRepository;
use telegram_bot::config::{
    BaseConfig, City, ChatsConfig, FeedsConfig, RepliesConfig, ScheduleConfig,
};
use telegram_bot::{BotComponents, BotConfig};
use tokio::sync::RwLock;

pub const TARGET_CHAT: i64 = -100123;
pub const ADMIN_CHAT: i64 = 42;
pub const USER_ID: i64 = 55;
pub const BOT_USERNAME: &str = "mybot";
pub const FALLBACK: [&str; 2] = ["Занят, потом отвечу.", "Спроси позже."];

/// Records every outgoing message as (chat id, text).
#[derive(Default)]
pub struct RecordingBot {
    pub sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingBot {
    pub fn sent_to(&self, chat_id: i64) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> mbot_core::Result<()> {
        self.sent.lock().unwrap().push((chat.id, text.to_string()));
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> mbot_core::Result<()> {
        self.send_message(&message.chat, text).await
    }
}

pub enum Script {
    Reply(&'static str),
    Fail,
    Hang,
}

/// LLM double: answers, fails or never answers.
pub struct ScriptedLlm {
    script: Script,
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedLlm {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn get_llm_response_with_messages(
        &self,
        messages: Vec<ChatMessage>,
    ) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(messages);
        match self.script {
            Script::Reply(text) => Ok(text.to_string()),
            Script::Fail => Err(anyhow::anyhow!("provider exploded")),
            Script::Hang => std::future::pending().await,
        }
    }
}

/// Weather by query; unknown queries fail with HTTP 404.
#[derive(Default)]
pub struct FakeWeather {
    pub by_query: HashMap<String, Weather>,
}

impl FakeWeather {
    pub fn with(entries: &[(&str, f64, &str)]) -> Arc<Self> {
        Arc::new(Self {
            by_query: entries
                .iter()
                .map(|(query, temp, desc)| {
                    (
                        query.to_string(),
                        Weather {
                            city: query.to_string(),
                            temp: *temp,
                            description: desc.to_string(),
                        },
                    )
                })
                .collect(),
        })
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn current(&self, query: &str) -> ProviderResult<Weather> {
        self.by_query
            .get(query)
            .cloned()
            .ok_or(ProviderError::Status {
                provider: "openweather",
                status: 404,
            })
    }
}

pub struct FakeRates(pub Option<UsdRates>);

#[async_trait]
impl RatesProvider for FakeRates {
    async fn usd_rates(&self) -> ProviderResult<UsdRates> {
        self.0.ok_or(ProviderError::Status {
            provider: "currency-api",
            status: 503,
        })
    }
}

pub struct FakeCrypto(pub Option<CryptoPrices>);

#[async_trait]
impl CryptoProvider for FakeCrypto {
    async fn prices(&self) -> ProviderResult<CryptoPrices> {
        self.0.ok_or(ProviderError::Status {
            provider: "coingecko",
            status: 429,
        })
    }
}

pub fn test_config(export_dir: PathBuf) -> BotConfig {
    let replies = RepliesConfig {
        persona: Persona::default(),
        fallback: PhrasePool::new(FALLBACK.iter().map(|s| s.to_string()).collect(), Vec::new()),
        greeting: PhrasePool::new(vec!["Хорошего дня!".to_string()], Vec::new()),
        triggers: HashMap::from([(
            "летал?".to_string(),
            PhrasePool::new(vec!["Летал, конечно.".to_string()], Vec::new()),
        )]),
        rare_probability: 0.1,
        history_limit: 30,
    };
    BotConfig {
        base: BaseConfig {
            telegram: TelegramConfig::with_token("test_token".to_string()),
            log_file: "logs/test.log".to_string(),
            database_url: "sqlite::memory:".to_string(),
        },
        ai: LlmSettings {
            api_key: "test_key".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
            model: "deepseek-chat".to_string(),
            params: CompletionParams::default(),
            timeout: Duration::from_millis(50),
        },
        chats: ChatsConfig {
            target_chat_id: TARGET_CHAT,
            allowed_chat_ids: vec![TARGET_CHAT],
            admin_chat_id: Some(ADMIN_CHAT),
        },
        feeds: FeedsConfig {
            openweather_api_key: "owm_key".to_string(),
            weather_cities: vec![City::new("Minsk", "Minsk,BY")],
            morning_cities: vec![City::new("Минск", "Minsk,BY"), City::new("Гомель", "Gomel,BY")],
            timeout: Duration::from_secs(1),
        },
        schedule: ScheduleConfig {
            timezone: chrono_tz::Europe::Moscow,
            morning_cron: "0 0 8 * * *".to_string(),
            evening_stats_cron: "0 0 21 * * *".to_string(),
            cleanup_cron: "0 0 0 * * *".to_string(),
            health_check_interval: Duration::from_secs(30 * 60),
            export_enabled: true,
            export_interval: Duration::from_secs(24 * 3600),
            export_dir,
            retention_days: 30,
            morning_on_startup: false,
        },
        replies,
    }
}

pub struct Fixture {
    pub components: Arc<BotComponents>,
    pub bot: Arc<RecordingBot>,
    pub llm: Arc<ScriptedLlm>,
}

/// Components over an in-memory store. Weather knows Minsk (5°C) and Gomel (3°C).
pub async fn fixture_with(config: BotConfig, script: Script) -> Fixture {
    let bot = Arc::new(RecordingBot::default());
    let llm = ScriptedLlm::new(script);
    let composer = ResponseComposer::with_seed(
        llm.clone(),
        config
            .replies
            .composer_config(config.ai.timeout, config.schedule.timezone),
        7,
    );
    let repo = StatsRepository::new(config.database_url()).await.unwrap();

    let components = BotComponents {
        config: Arc::new(config),
        repo: Arc::new(repo),
        weather: FakeWeather::with(&[("Minsk,BY", 5.0, "ясно"), ("Gomel,BY", 3.0, "облачно")]),
        rates: Arc::new(FakeRates(Some(UsdRates {
            byn: 3.2736,
            rub: 81.5,
        }))),
        crypto: Arc::new(FakeCrypto(Some(CryptoPrices {
            btc_usd: 67000.5,
            wld_usd: 1.85,
        }))),
        composer: Arc::new(composer),
        bot: bot.clone(),
        bot_username: Arc::new(RwLock::new(Some(BOT_USERNAME.to_string()))),
        started_at: Utc::now(),
    };
    Fixture {
        components: Arc::new(components),
        bot,
        llm,
    }
}

pub async fn fixture(script: Script) -> Fixture {
    fixture_with(test_config(std::env::temp_dir().join("mbot-exports")), script).await
}

pub fn message(chat_id: i64, id: &str, text: &str) -> Message {
    Message {
        id: id.to_string(),
        user: User {
            id: USER_ID,
            username: Some("ivan".to_string()),
            first_name: Some("Ivan".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: chat_id,
            chat_type: "supergroup".to_string(),
            title: Some("Родные".to_string()),
        },
        content: text.to_string(),
        created_at: Utc::now(),
        reply_to_message_id: None,
        reply_to_message_from_bot: false,
        reply_to_message_content: None,
    }
}

/// Same components with some feeds swapped.
pub fn with_feeds(
    components: &BotComponents,
    weather: Option<Arc<dyn WeatherProvider>>,
    rates: Option<Arc<dyn RatesProvider>>,
    crypto: Option<Arc<dyn CryptoProvider>>,
) -> Arc<BotComponents> {
    Arc::new(BotComponents {
        config: components.config.clone(),
        repo: components.repo.clone(),
        weather: weather.unwrap_or_else(|| components.weather.clone()),
        rates: rates.unwrap_or_else(|| components.rates.clone()),
        crypto: crypto.unwrap_or_else(|| components.crypto.clone()),
        composer: components.composer.clone(),
        bot: components.bot.clone(),
        bot_username: components.bot_username.clone(),
        started_at: components.started_at,
    })
}
