//! Config tests. Each test starts from a cleared environment.

use crate::config::BotConfig;
use mbot_core::BotError;
use serial_test::serial;
use std::env;
use std::time::Duration;

const VARS: &[&str] = &[
    "BOT_TOKEN",
    "TELEGRAM_TOKEN",
    "TELEGRAM_API_URL",
    "TELOXIDE_API_URL",
    "DATABASE_URL",
    "LOG_FILE",
    "OPENAI_API_KEY",
    "DEEPSEEK_API_KEY",
    "OPENAI_BASE_URL",
    "AI_MODEL",
    "AI_MAX_TOKENS",
    "AI_TEMPERATURE",
    "AI_TIMEOUT_SECS",
    "CHAT_HISTORY_LIMIT",
    "OPENWEATHER_API_KEY",
    "WEATHER_CITIES",
    "MORNING_CITIES",
    "PROVIDER_TIMEOUT_SECS",
    "TARGET_CHAT_ID",
    "CHAT_ID",
    "ALLOWED_CHAT_IDS",
    "ADMIN_CHAT_ID",
    "TIMEZONE",
    "MORNING_CRON",
    "EVENING_STATS_CRON",
    "CLEANUP_CRON",
    "HEALTH_CHECK_INTERVAL_MINS",
    "EXPORT_ENABLED",
    "EXPORT_INTERVAL_HOURS",
    "EXPORT_DIR",
    "RETENTION_DAYS",
    "PERSONA_NAME",
    "PERSONA_TONE",
    "PERSONA_PROMPT",
    "SYSTEM_PROMPT",
    "FALLBACK_PHRASES",
    "RARE_FALLBACK_PHRASES",
    "RARE_PROBABILITY",
    "TRIGGER_PHRASES",
    "MORNING_ON_STARTUP",
];

fn clean_env_with_required() {
    for key in VARS {
        env::remove_var(key);
    }
    env::set_var("BOT_TOKEN", "test_token");
    env::set_var("OPENAI_API_KEY", "test_key");
    env::set_var("OPENWEATHER_API_KEY", "owm_key");
    env::set_var("TARGET_CHAT_ID", "-100123");
}

#[test]
#[serial]
fn test_load_config_with_defaults() {
    clean_env_with_required();

    let config = BotConfig::load(None).unwrap();

    assert_eq!(config.bot_token(), "test_token");
    assert!(config.telegram_api_url().is_none());
    assert_eq!(config.database_url(), "sqlite:./data/bot.db");
    assert_eq!(config.log_file(), "logs/telegram-bot.log");
    assert_eq!(config.ai.base_url, "https://api.deepseek.com");
    assert_eq!(config.ai.model, "deepseek-chat");
    assert_eq!(config.ai.params.max_tokens, 999);
    assert_eq!(config.ai.timeout, Duration::from_secs(20));

    assert_eq!(config.chats.target_chat_id, -100123);
    assert_eq!(config.chats.allowed_chat_ids, vec![-100123]);
    assert!(config.chats.admin_chat_id.is_none());

    assert_eq!(config.feeds.weather_cities.len(), 3);
    assert_eq!(config.feeds.weather_cities[0].query, "Minsk,BY");
    assert_eq!(config.feeds.morning_cities.len(), 6);
    assert_eq!(config.feeds.timeout, Duration::from_secs(10));

    assert_eq!(config.schedule.timezone, chrono_tz::Europe::Moscow);
    assert_eq!(config.schedule.morning_cron, "0 30 7 * * *");
    assert_eq!(config.schedule.health_check_interval, Duration::from_secs(30 * 60));
    assert!(config.schedule.export_enabled);
    assert_eq!(config.schedule.export_interval, Duration::from_secs(24 * 3600));
    assert_eq!(config.schedule.retention_days, 30);
    assert!(!config.schedule.morning_on_startup);

    assert_eq!(config.replies.rare_probability, 0.1);
    assert_eq!(config.replies.history_limit, 30);
    assert!(!config.replies.fallback.common.is_empty());
    assert!(config.replies.triggers.is_empty());
}

#[test]
#[serial]
fn test_load_config_with_custom_values() {
    clean_env_with_required();
    env::remove_var("BOT_TOKEN");
    env::remove_var("OPENAI_API_KEY");
    env::remove_var("TARGET_CHAT_ID");
    env::set_var("TELEGRAM_TOKEN", "alias_token");
    env::set_var("DEEPSEEK_API_KEY", "ds_key");
    env::set_var("CHAT_ID", "-5");
    env::set_var("ALLOWED_CHAT_IDS", "-5, -6");
    env::set_var("ADMIN_CHAT_ID", "42");
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("WEATHER_CITIES", r#"[["Minsk","Minsk,BY"]]"#);
    env::set_var("TIMEZONE", "Europe/Minsk");
    env::set_var("MORNING_CRON", "0 8 * * *");
    env::set_var("EXPORT_ENABLED", "false");
    env::set_var("MORNING_ON_STARTUP", "true");
    env::set_var("RARE_PROBABILITY", "0.5");
    env::set_var("PERSONA_NAME", "Толян");
    env::set_var(
        "TRIGGER_PHRASES",
        r#"{"Летал?": {"common": ["нет", "да"], "rare": ["редко"]}, "пусто": {}}"#,
    );

    let config = BotConfig::load(None).unwrap();

    assert_eq!(config.bot_token(), "alias_token");
    assert_eq!(config.ai.api_key, "ds_key");
    assert_eq!(config.chats.target_chat_id, -5);
    assert_eq!(config.chats.allowed_chat_ids, vec![-5, -6]);
    assert_eq!(config.chats.admin_chat_id, Some(42));
    assert_eq!(config.database_url(), "sqlite::memory:");
    assert_eq!(config.feeds.weather_cities.len(), 1);
    assert_eq!(config.feeds.weather_cities[0].label, "Minsk");
    assert_eq!(config.schedule.timezone, chrono_tz::Europe::Minsk);
    assert_eq!(config.schedule.morning_cron, "0 8 * * *");
    assert!(!config.schedule.export_enabled);
    assert!(config.schedule.morning_on_startup);
    assert_eq!(config.replies.rare_probability, 0.5);
    assert_eq!(config.replies.persona.name, "Толян");

    let pool = config.replies.triggers.get("летал?").unwrap();
    assert_eq!(pool.common, vec!["нет".to_string(), "да".to_string()]);
    assert_eq!(pool.rare, vec!["редко".to_string()]);
    assert!(!config.replies.triggers.contains_key("пусто"));
}

#[test]
#[serial]
fn test_load_config_with_override_token() {
    clean_env_with_required();
    let config = BotConfig::load(Some("override_token".to_string())).unwrap();
    assert_eq!(config.bot_token(), "override_token");
}

#[test]
#[serial]
fn test_missing_required_values_are_configuration_errors() {
    for missing in ["BOT_TOKEN", "OPENAI_API_KEY", "OPENWEATHER_API_KEY", "TARGET_CHAT_ID"] {
        clean_env_with_required();
        env::remove_var(missing);
        match BotConfig::load(None) {
            Err(BotError::Configuration(msg)) => assert!(msg.contains(missing), "{}: {}", missing, msg),
            other => panic!("{}: expected configuration error, got {:?}", missing, other.map(|_| ())),
        }
    }
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    let cases = [
        ("TARGET_CHAT_ID", "not-a-number"),
        ("WEATHER_CITIES", "[broken"),
        ("WEATHER_CITIES", "[]"),
        ("TIMEZONE", "Mars/Olympus"),
        ("MORNING_CRON", "99 99 * * *"),
        ("RARE_PROBABILITY", "1.5"),
        ("EXPORT_ENABLED", "maybe"),
        ("HEALTH_CHECK_INTERVAL_MINS", "0"),
        ("ALLOWED_CHAT_IDS", "1,abc"),
    ];
    for (key, value) in cases {
        clean_env_with_required();
        env::set_var(key, value);
        assert!(
            matches!(BotConfig::load(None), Err(BotError::Configuration(_))),
            "{}={} should be rejected",
            key,
            value
        );
    }
}

#[test]
#[serial]
fn test_validate_rejects_bad_api_url() {
    clean_env_with_required();
    env::set_var("TELEGRAM_API_URL", "not a url");
    let config = BotConfig::load(None).unwrap();
    assert!(config.validate().is_err());
    env::remove_var("TELEGRAM_API_URL");
}
