//! LLM settings loaded from environment variables.

use anyhow::{Context, Result};
use openai_client::CompletionParams;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub params: CompletionParams,
    /// Upper bound for one completion call; the composer falls back to canned phrases past it.
    pub timeout: Duration,
}

impl LlmSettings {
    /// Reads OPENAI_API_KEY (or DEEPSEEK_API_KEY), OPENAI_BASE_URL, AI_MODEL, AI_MAX_TOKENS,
    /// AI_TEMPERATURE and AI_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .or_else(|_| env::var("DEEPSEEK_API_KEY"))
            .context("OPENAI_API_KEY not set")?;
        let base_url = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let defaults = CompletionParams::default();
        let max_tokens = parse_or(env::var("AI_MAX_TOKENS").ok(), defaults.max_tokens)
            .context("AI_MAX_TOKENS must be a positive integer")?;
        let temperature = parse_or(env::var("AI_TEMPERATURE").ok(), defaults.temperature)
            .context("AI_TEMPERATURE must be a number")?;
        let timeout_secs: u64 = parse_or(env::var("AI_TIMEOUT_SECS").ok(), 20)
            .context("AI_TIMEOUT_SECS must be a positive integer")?;
        Ok(Self {
            api_key,
            base_url,
            model,
            params: CompletionParams {
                max_tokens,
                temperature,
            },
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().parse()?),
        _ => Ok(default),
    }
}
