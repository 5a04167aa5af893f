//! # Feeds
//!
//! HTTP clients for the data the bot posts: current weather (OpenWeather), USD exchange rates
//! (fawazahmed0 currency API) and crypto prices (CoinGecko).
//!
//! Each source sits behind a capability trait ([`WeatherProvider`], [`RatesProvider`],
//! [`CryptoProvider`]) so handlers and jobs can be tested with in-process fakes. Every client
//! accepts `with_base_url` for mock servers and carries a per-request timeout.

mod cache;
mod crypto;
mod error;
mod rates;
mod weather;

pub use cache::TtlCache;
pub use crypto::{CoinGeckoClient, CryptoPrices, CryptoProvider, COINGECKO_BASE_URL};
pub use error::{ProviderError, ProviderResult};
pub use rates::{CurrencyApiClient, RatesProvider, UsdRates, CURRENCY_API_BASE_URL};
pub use weather::{OpenWeatherClient, Weather, WeatherProvider, OPENWEATHER_BASE_URL};

use std::time::Duration;

/// Default timeout applied to every provider request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| ProviderError::Request {
            provider: "http",
            source,
        })
}

/// Sends a GET and decodes the JSON body, mapping transport, status and decode failures.
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|source| ProviderError::Request { provider, source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Decode {
            provider,
            reason: e.to_string(),
        })
}
