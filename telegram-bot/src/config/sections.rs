//! Application sections of the config: which chats, which cities, when jobs run, how to reply.

use chrono_tz::Tz;
use composer::{ComposerConfig, Persona, PhrasePool, DEFAULT_GREETING};
use mbot_core::{BotError, Result};
use scheduler::Trigger;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::env::{flag, id_list, json_or, parse_or, required, parse_value, var, var_any};

/// Display label and OpenWeather query (`"Minsk,BY"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub label: String,
    pub query: String,
}

impl City {
    pub fn new(label: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            query: query.into(),
        }
    }
}

fn cities(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(l, q)| (l.to_string(), q.to_string()))
        .collect()
}

fn load_cities(name: &str, default: &[(&str, &str)]) -> Result<Vec<City>> {
    let pairs: Vec<(String, String)> = json_or(name, || cities(default))?;
    if pairs.is_empty() {
        return Err(BotError::Configuration(format!("{} must list at least one city", name)));
    }
    Ok(pairs.into_iter().map(|(l, q)| City::new(l, q)).collect())
}

#[derive(Debug, Clone)]
pub struct ChatsConfig {
    /// TARGET_CHAT_ID (or CHAT_ID): morning message and evening statistics go here.
    pub target_chat_id: i64,
    /// ALLOWED_CHAT_IDS: chats whose ordinary messages are recorded. Defaults to the target chat.
    pub allowed_chat_ids: Vec<i64>,
    /// ADMIN_CHAT_ID: startup, export and morning notifications.
    pub admin_chat_id: Option<i64>,
}

impl ChatsConfig {
    pub fn from_env() -> Result<Self> {
        let target = required(&["TARGET_CHAT_ID", "CHAT_ID"])?;
        let target_chat_id = parse_value("TARGET_CHAT_ID", &target, "a chat id")?;
        let allowed_chat_ids = id_list("ALLOWED_CHAT_IDS")?.unwrap_or_else(|| vec![target_chat_id]);
        let admin_chat_id = match var("ADMIN_CHAT_ID") {
            Some(v) => Some(parse_value("ADMIN_CHAT_ID", &v, "a chat id")?),
            None => None,
        };
        Ok(Self {
            target_chat_id,
            allowed_chat_ids,
            admin_chat_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FeedsConfig {
    pub openweather_api_key: String,
    /// Cities of `/pogoda`.
    pub weather_cities: Vec<City>,
    /// Cities of the morning message.
    pub morning_cities: Vec<City>,
    pub timeout: Duration,
}

const WEATHER_CITIES: &[(&str, &str)] = &[
    ("Минск", "Minsk,BY"),
    ("Гомель", "Gomel,BY"),
    ("Жлобин", "Zhlobin,BY"),
];

const MORNING_CITIES: &[(&str, &str)] = &[
    ("Минск", "Minsk,BY"),
    ("Жлобин", "Zhlobin,BY"),
    ("Гомель", "Gomel,BY"),
    ("Житковичи", "Zhitkovichi,BY"),
    ("Шри-Ланка", "Colombo,LK"),
    ("Ноябрьск", "Noyabrsk,RU"),
];

impl FeedsConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            openweather_api_key: required(&["OPENWEATHER_API_KEY"])?,
            weather_cities: load_cities("WEATHER_CITIES", WEATHER_CITIES)?,
            morning_cities: load_cities("MORNING_CITIES", MORNING_CITIES)?,
            timeout: Duration::from_secs(parse_or(
                "PROVIDER_TIMEOUT_SECS",
                10,
                "a number of seconds",
            )?),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub timezone: Tz,
    pub morning_cron: String,
    pub evening_stats_cron: String,
    pub cleanup_cron: String,
    pub health_check_interval: Duration,
    pub export_enabled: bool,
    pub export_interval: Duration,
    pub export_dir: PathBuf,
    pub retention_days: i64,
    /// One-shot morning message a minute after start.
    pub morning_on_startup: bool,
}

impl ScheduleConfig {
    pub fn from_env() -> Result<Self> {
        let tz_name = var("TIMEZONE").unwrap_or_else(|| "Europe/Moscow".to_string());
        let timezone = Tz::from_str(&tz_name)
            .map_err(|_| BotError::Configuration(format!("TIMEZONE={:?} is not an IANA timezone", tz_name)))?;

        let cron = |name: &str, default: &str| -> Result<String> {
            let expr = var(name).unwrap_or_else(|| default.to_string());
            Trigger::cron(&expr, &tz_name)
                .map_err(|e| BotError::Configuration(format!("{}: {}", name, e)))?;
            Ok(expr)
        };

        let health_mins: u64 = parse_or("HEALTH_CHECK_INTERVAL_MINS", 30, "a number of minutes")?;
        let export_hours: u64 = parse_or("EXPORT_INTERVAL_HOURS", 24, "a number of hours")?;
        if health_mins == 0 || export_hours == 0 {
            return Err(BotError::Configuration(
                "HEALTH_CHECK_INTERVAL_MINS and EXPORT_INTERVAL_HOURS must be positive".to_string(),
            ));
        }

        Ok(Self {
            timezone,
            morning_cron: cron("MORNING_CRON", "0 30 7 * * *")?,
            evening_stats_cron: cron("EVENING_STATS_CRON", "0 0 21 * * *")?,
            cleanup_cron: cron("CLEANUP_CRON", "0 0 0 * * *")?,
            health_check_interval: Duration::from_secs(health_mins * 60),
            export_enabled: flag("EXPORT_ENABLED", true)?,
            export_interval: Duration::from_secs(export_hours * 3600),
            export_dir: PathBuf::from(var("EXPORT_DIR").unwrap_or_else(|| "./exports".to_string())),
            retention_days: parse_or("RETENTION_DAYS", 30, "a number of days")?,
            morning_on_startup: flag("MORNING_ON_STARTUP", false)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PoolSpec {
    #[serde(default)]
    common: Vec<String>,
    #[serde(default)]
    rare: Vec<String>,
}

pub const DEFAULT_FALLBACK_PHRASES: &[&str] = &[
    "Что-то я задумался. Спроси чуть позже.",
    "Сейчас не до этого, давай потом.",
    "Связь с космосом пропала, повтори попозже.",
];

pub const DEFAULT_RARE_FALLBACK_PHRASES: &[&str] = &["Без комментариев."];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct RepliesConfig {
    pub persona: Persona,
    pub fallback: PhrasePool,
    pub greeting: PhrasePool,
    /// Trigger phrase (lowercase) → its canned replies.
    pub triggers: HashMap<String, PhrasePool>,
    pub rare_probability: f64,
    /// Number of recent records sent to the AI as context.
    pub history_limit: i64,
}

impl RepliesConfig {
    pub fn from_env() -> Result<Self> {
        let default_persona = Persona::default();
        let persona = Persona {
            name: var("PERSONA_NAME").unwrap_or(default_persona.name),
            tone: var("PERSONA_TONE").unwrap_or(default_persona.tone),
            instructions: var_any(&["PERSONA_PROMPT", "SYSTEM_PROMPT"])
                .unwrap_or(default_persona.instructions),
        };

        let common: Vec<String> = json_or("FALLBACK_PHRASES", || owned(DEFAULT_FALLBACK_PHRASES))?;
        let rare: Vec<String> =
            json_or("RARE_FALLBACK_PHRASES", || owned(DEFAULT_RARE_FALLBACK_PHRASES))?;
        let fallback = PhrasePool::new(common, rare);
        if fallback.is_empty() {
            return Err(BotError::Configuration(
                "FALLBACK_PHRASES and RARE_FALLBACK_PHRASES are both empty".to_string(),
            ));
        }

        let specs: HashMap<String, PoolSpec> = json_or("TRIGGER_PHRASES", HashMap::new)?;
        let triggers = specs
            .into_iter()
            .map(|(phrase, spec)| (phrase.trim().to_lowercase(), PhrasePool::new(spec.common, spec.rare)))
            .filter(|(phrase, pool)| !phrase.is_empty() && !pool.is_empty())
            .collect();

        let rare_probability: f64 = parse_or("RARE_PROBABILITY", 0.1, "a number")?;
        if !(0.0..=1.0).contains(&rare_probability) {
            return Err(BotError::Configuration(format!(
                "RARE_PROBABILITY={} must be between 0 and 1",
                rare_probability
            )));
        }

        Ok(Self {
            persona,
            fallback,
            greeting: PhrasePool::new(vec![DEFAULT_GREETING.to_string()], Vec::new()),
            triggers,
            rare_probability,
            history_limit: parse_or("CHAT_HISTORY_LIMIT", 30, "a number of messages")?,
        })
    }

    pub fn composer_config(&self, timeout: Duration, timezone: Tz) -> ComposerConfig {
        ComposerConfig {
            persona: self.persona.clone(),
            fallback: self.fallback.clone(),
            greeting: self.greeting.clone(),
            triggers: self.triggers.clone(),
            rare_probability: self.rare_probability,
            timeout,
            timezone,
        }
    }
}
