//! BTC and WLD prices in USD from CoinGecko `simple/price`. Never cached.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::{get_json, http_client, ProviderError, ProviderResult};

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

const PROVIDER: &str = "crypto";
const BTC_ID: &str = "bitcoin";
const WLD_ID: &str = "worldcoin-wld";
/// Older CoinGecko id for Worldcoin, tried when the primary id has no price.
const WLD_LEGACY_ID: &str = "world-coin";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CryptoPrices {
    pub btc_usd: f64,
    pub wld_usd: f64,
}

#[async_trait]
pub trait CryptoProvider: Send + Sync {
    async fn prices(&self) -> ProviderResult<CryptoPrices>;
}

type PriceTable = HashMap<String, HashMap<String, f64>>;

pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(timeout: Duration) -> ProviderResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: COINGECKO_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch(&self, ids: &str) -> ProviderResult<PriceTable> {
        let url = format!("{}/simple/price", self.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("ids", ids), ("vs_currencies", "usd")]);
        get_json(PROVIDER, request).await
    }
}

fn usd_price(table: &PriceTable, id: &str) -> Option<f64> {
    table
        .get(id)
        .and_then(|prices| prices.get("usd"))
        .copied()
        .filter(|p| *p > 0.0)
}

#[async_trait]
impl CryptoProvider for CoinGeckoClient {
    #[instrument(skip(self))]
    async fn prices(&self) -> ProviderResult<CryptoPrices> {
        let table = self.fetch(&format!("{},{}", BTC_ID, WLD_ID)).await?;
        let btc_usd = usd_price(&table, BTC_ID).ok_or_else(|| ProviderError::Decode {
            provider: PROVIDER,
            reason: "missing bitcoin price".to_string(),
        })?;

        let wld_usd = match usd_price(&table, WLD_ID) {
            Some(price) => price,
            None => {
                warn!(id = WLD_ID, fallback = WLD_LEGACY_ID, "WLD price missing, retrying with legacy id");
                let legacy = self.fetch(WLD_LEGACY_ID).await?;
                usd_price(&legacy, WLD_LEGACY_ID).ok_or_else(|| ProviderError::Decode {
                    provider: PROVIDER,
                    reason: "missing worldcoin price".to_string(),
                })?
            }
        };

        info!(btc_usd, wld_usd, "Crypto prices fetched");
        Ok(CryptoPrices { btc_usd, wld_usd })
    }
}
