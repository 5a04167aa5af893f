//! Component factory: builds BotComponents from config. Isolates assembly logic from runner.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use composer::ResponseComposer;
use dispatcher::Dispatcher;
use feeds::{
    CoinGeckoClient, CryptoProvider, CurrencyApiClient, OpenWeatherClient, RatesProvider,
    WeatherProvider,
};
use llm_client::{LlmClient, OpenAILlmClient};
use mbot_core::Bot;
use std::sync::Arc;
use storage::StatsRepository;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::config::BotConfig;
use crate::handlers::{
    ChatStatsHandler, GeneralHandler, MentionHandler, ResetHandler, StartHandler, StatsHandler,
    TestHandler, TriggerHandler, UsersStatHandler, VersionHandler,
};
use crate::handlers::{CryptoHandler, RatesHandler, RatesPair, WeatherHandler};
use crate::middleware::StatsMiddleware;

/// Shared dependencies of handlers and jobs.
pub struct BotComponents {
    pub config: Arc<BotConfig>,
    pub repo: Arc<StatsRepository>,
    pub weather: Arc<dyn WeatherProvider>,
    pub rates: Arc<dyn RatesProvider>,
    pub crypto: Arc<dyn CryptoProvider>,
    pub composer: Arc<ResponseComposer>,
    /// Outgoing messages: TelegramBotAdapter in production, a recording mock in tests.
    pub bot: Arc<dyn Bot>,
    pub bot_username: Arc<RwLock<Option<String>>>,
    pub started_at: DateTime<Utc>,
}

/// Builds the feed clients from config.
pub fn build_feeds(
    config: &BotConfig,
) -> Result<(Arc<dyn WeatherProvider>, Arc<dyn RatesProvider>, Arc<dyn CryptoProvider>)> {
    let timeout = config.feeds.timeout;
    let weather = OpenWeatherClient::new(config.feeds.openweather_api_key.clone(), timeout)
        .context("Failed to build weather client")?;
    let rates = CurrencyApiClient::new(timeout).context("Failed to build currency client")?;
    let crypto = CoinGeckoClient::new(timeout).context("Failed to build crypto client")?;
    Ok((Arc::new(weather), Arc::new(rates), Arc::new(crypto)))
}

/// Builds the response composer on top of the OpenAI-compatible client.
pub fn build_composer(config: &BotConfig) -> ResponseComposer {
    let llm: Arc<dyn LlmClient> = Arc::new(OpenAILlmClient::from_settings(&config.ai));
    ResponseComposer::new(
        llm,
        config
            .replies
            .composer_config(config.ai.timeout, config.schedule.timezone),
    )
}

/// Builds BotComponents for `bot` (the outgoing side).
#[instrument(skip(config, bot))]
pub async fn build_bot_components(config: Arc<BotConfig>, bot: Arc<dyn Bot>) -> Result<BotComponents> {
    let repo = Arc::new(
        StatsRepository::new(config.database_url())
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    database_url = %config.database_url(),
                    "Failed to initialize statistics storage"
                );
                anyhow::anyhow!("Failed to initialize statistics storage: {}", e)
            })?,
    );
    let (weather, rates, crypto) = build_feeds(&config)?;
    let composer = Arc::new(build_composer(&config));
    info!(model = %config.ai.model, "Components built");

    Ok(BotComponents {
        config,
        repo,
        weather,
        rates,
        crypto,
        composer,
        bot,
        bot_username: Arc::new(RwLock::new(None)),
        started_at: Utc::now(),
    })
}

/// Builds the route table: stats middleware, commands, mention, trigger phrases, general.
pub fn build_dispatcher(components: &Arc<BotComponents>) -> Dispatcher {
    let c = components;
    let mut dispatcher = Dispatcher::new(c.bot_username.clone())
        .add_middleware(Arc::new(StatsMiddleware::new(c.repo.clone())))
        .command("start", Arc::new(StartHandler))
        .command("version", Arc::new(VersionHandler))
        .command("reset", Arc::new(ResetHandler::new(c.repo.clone())))
        .command("stats", Arc::new(StatsHandler::new(c.clone())))
        .command("test", Arc::new(TestHandler::new(c.clone())))
        .command("pogoda", Arc::new(WeatherHandler::new(c.clone())))
        .command("byn", Arc::new(RatesHandler::new(c.clone(), RatesPair::UsdByn)))
        .command("rub", Arc::new(RatesHandler::new(c.clone(), RatesPair::UsdRub)))
        .command("wld", Arc::new(CryptoHandler::new(c.clone())))
        .command("chatstats", Arc::new(ChatStatsHandler::new(c.repo.clone())))
        .command("users_stat", Arc::new(UsersStatHandler::new(c.repo.clone())))
        .mention(Arc::new(MentionHandler::new(c.clone())))
        .general(Arc::new(GeneralHandler))
        .allow_chats(c.config.chats.allowed_chat_ids.iter().copied());

    let trigger = Arc::new(TriggerHandler::new(c.composer.clone()));
    for phrase in c.config.replies.triggers.keys() {
        dispatcher = dispatcher.trigger(phrase, trigger.clone());
    }
    info!(commands = ?dispatcher.command_names(), "Dispatcher built");
    dispatcher
}
