//! USD exchange rates from the fawazahmed0 currency API (`currencies/usd.json`).

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{get_json, http_client, ProviderError, ProviderResult, TtlCache};

pub const CURRENCY_API_BASE_URL: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1";

const PROVIDER: &str = "currency";
const CACHE_TTL: Duration = Duration::from_secs(60 * 60);
const CACHE_KEY: &str = "usd";

/// Price of one US dollar in Belarusian and Russian roubles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsdRates {
    pub byn: f64,
    pub rub: f64,
}

#[async_trait]
pub trait RatesProvider: Send + Sync {
    async fn usd_rates(&self) -> ProviderResult<UsdRates>;
}

#[derive(Debug, Deserialize)]
struct UsdResponse {
    usd: HashMap<String, f64>,
}

pub struct CurrencyApiClient {
    client: reqwest::Client,
    base_url: String,
    cache: TtlCache<UsdRates>,
}

impl CurrencyApiClient {
    pub fn new(timeout: Duration) -> ProviderResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: CURRENCY_API_BASE_URL.to_string(),
            cache: TtlCache::new(CACHE_TTL),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

fn positive_rate(rates: &HashMap<String, f64>, code: &str) -> ProviderResult<f64> {
    rates
        .get(code)
        .copied()
        .filter(|v| *v > 0.0)
        .ok_or_else(|| ProviderError::Decode {
            provider: PROVIDER,
            reason: format!("missing usd→{} rate", code),
        })
}

#[async_trait]
impl RatesProvider for CurrencyApiClient {
    #[instrument(skip(self))]
    async fn usd_rates(&self) -> ProviderResult<UsdRates> {
        if let Some(hit) = self.cache.get(CACHE_KEY) {
            debug!("Currency cache hit");
            return Ok(hit);
        }

        let url = format!("{}/currencies/usd.json", self.base_url);
        let body: UsdResponse = get_json(PROVIDER, self.client.get(&url)).await?;
        let rates = UsdRates {
            byn: positive_rate(&body.usd, "byn")?,
            rub: positive_rate(&body.usd, "rub")?,
        };
        self.cache.insert(CACHE_KEY, rates);
        Ok(rates)
    }
}
