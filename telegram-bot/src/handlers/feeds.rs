//! Feed commands: `/pogoda`, `/byn`, `/rub`, `/wld`. Provider failures become a short
//! "try later" text; the provider error itself only reaches the log.

use async_trait::async_trait;
use mbot_core::{Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use storage::ApiProvider;
use tracing::{instrument, warn};

use super::{count_call, local_now};
use crate::components::BotComponents;
use crate::format::{rate_report, weather_report, wld_report};

pub const RATES_UNAVAILABLE: &str = "Не удалось получить курс валют. Попробуйте позже.";
pub const WLD_UNAVAILABLE: &str = "Не удалось получить курс WLD. Попробуйте позже.";

pub struct WeatherHandler {
    components: Arc<BotComponents>,
}

impl WeatherHandler {
    pub fn new(components: Arc<BotComponents>) -> Self {
        Self { components }
    }
}

#[async_trait]
impl Handler for WeatherHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id, user_id = message.user.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let c = &self.components;
        let mut rows = Vec::with_capacity(c.config.feeds.weather_cities.len());
        for city in &c.config.feeds.weather_cities {
            let weather = match c.weather.current(&city.query).await {
                Ok(w) => Some(w),
                Err(e) => {
                    warn!(city = %city.query, error = %e, "Weather lookup failed");
                    None
                }
            };
            rows.push((city.label.clone(), weather));
        }
        count_call(&c.repo, message, ApiProvider::Weather).await?;
        Ok(HandlerResponse::Reply(weather_report(&rows)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatesPair {
    UsdByn,
    UsdRub,
}

impl RatesPair {
    pub fn code(&self) -> &'static str {
        match self {
            RatesPair::UsdByn => "BYN",
            RatesPair::UsdRub => "RUB",
        }
    }
}

pub struct RatesHandler {
    components: Arc<BotComponents>,
    pair: RatesPair,
}

impl RatesHandler {
    pub fn new(components: Arc<BotComponents>, pair: RatesPair) -> Self {
        Self { components, pair }
    }
}

#[async_trait]
impl Handler for RatesHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id, pair = self.pair.code()))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let c = &self.components;
        let rates = c.rates.usd_rates().await;
        count_call(&c.repo, message, ApiProvider::Currency).await?;

        let text = match rates {
            Ok(rates) => {
                let rate = match self.pair {
                    RatesPair::UsdByn => rates.byn,
                    RatesPair::UsdRub => rates.rub,
                };
                rate_report(self.pair.code(), rate, local_now(c.config.schedule.timezone))
            }
            Err(e) => {
                warn!(error = %e, "Currency lookup failed");
                RATES_UNAVAILABLE.to_string()
            }
        };
        Ok(HandlerResponse::Reply(text))
    }
}

/// `/wld`: WorldCoin price, converted to BYN and RUB through the USD rates.
pub struct CryptoHandler {
    components: Arc<BotComponents>,
}

impl CryptoHandler {
    pub fn new(components: Arc<BotComponents>) -> Self {
        Self { components }
    }
}

#[async_trait]
impl Handler for CryptoHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let c = &self.components;
        let (prices, rates) = tokio::join!(c.crypto.prices(), c.rates.usd_rates());
        count_call(&c.repo, message, ApiProvider::Crypto).await?;
        count_call(&c.repo, message, ApiProvider::Currency).await?;

        let text = match (prices, rates) {
            (Ok(prices), Ok(rates)) => {
                wld_report(prices.wld_usd, &rates, local_now(c.config.schedule.timezone))
            }
            (prices, rates) => {
                if let Err(e) = prices {
                    warn!(error = %e, "Crypto lookup failed");
                }
                if let Err(e) = rates {
                    warn!(error = %e, "Currency lookup failed");
                }
                WLD_UNAVAILABLE.to_string()
            }
        };
        Ok(HandlerResponse::Reply(text))
    }
}
