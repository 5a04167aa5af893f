//! OpenWeather current weather (`/data/2.5/weather`, metric units, Russian descriptions).

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{get_json, http_client, ProviderError, ProviderResult, TtlCache};

pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

const PROVIDER: &str = "weather";
const CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    pub city: String,
    pub temp: f64,
    pub description: String,
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°C, {}", self.temp, self.description)
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current weather for a city query such as `"Minsk"` or `"Zhlobin,BY"`.
    async fn current(&self, query: &str) -> ProviderResult<Weather>;
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    #[serde(default)]
    name: String,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
}

pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    cache: TtlCache<Weather>,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> ProviderResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key: api_key.into(),
            base_url: OPENWEATHER_BASE_URL.to_string(),
            cache: TtlCache::new(CACHE_TTL),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn current(&self, query: &str) -> ProviderResult<Weather> {
        if let Some(hit) = self.cache.get(query) {
            debug!(query = %query, "Weather cache hit");
            return Ok(hit);
        }

        let url = format!("{}/data/2.5/weather", self.base_url);
        let request = self.client.get(&url).query(&[
            ("q", query),
            ("appid", self.api_key.as_str()),
            ("units", "metric"),
            ("lang", "ru"),
        ]);
        let body: OwmResponse = get_json(PROVIDER, request).await?;

        let description = body
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| ProviderError::Decode {
                provider: PROVIDER,
                reason: "no weather conditions in response".to_string(),
            })?;
        let city = if body.name.is_empty() {
            query.to_string()
        } else {
            body.name
        };

        let weather = Weather {
            city,
            temp: body.main.temp,
            description,
        };
        self.cache.insert(query, weather.clone());
        Ok(weather)
    }
}
