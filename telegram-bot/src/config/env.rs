//! Typed environment lookups. Every failure is a `BotError::Configuration` naming the variable.

use mbot_core::{BotError, Result};
use serde::de::DeserializeOwned;
use std::env;
use std::str::FromStr;

/// Trimmed value, `None` when unset or blank.
pub(crate) fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First set variable among `names`.
pub(crate) fn var_any(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| var(name))
}

pub(crate) fn required(names: &[&str]) -> Result<String> {
    var_any(names).ok_or_else(|| BotError::Configuration(format!("{} not set", names.join(" or "))))
}

fn invalid(name: &str, value: &str, expected: &str) -> BotError {
    BotError::Configuration(format!("{}={:?} is not {}", name, value, expected))
}

pub(crate) fn parse_value<T: FromStr>(name: &str, value: &str, expected: &str) -> Result<T> {
    value.trim().parse().map_err(|_| invalid(name, value, expected))
}

pub(crate) fn parse_or<T: FromStr>(name: &str, default: T, expected: &str) -> Result<T> {
    match var(name) {
        Some(v) => parse_value(name, &v, expected),
        None => Ok(default),
    }
}

pub(crate) fn flag(name: &str, default: bool) -> Result<bool> {
    match var(name).map(|v| v.to_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(name, &v, "a boolean")),
        },
    }
}

pub(crate) fn json_or<T: DeserializeOwned>(name: &str, default: impl FnOnce() -> T) -> Result<T> {
    match var(name) {
        Some(v) => serde_json::from_str(&v)
            .map_err(|e| BotError::Configuration(format!("{} is not valid JSON: {}", name, e))),
        None => Ok(default()),
    }
}

/// Comma-separated chat ids.
pub(crate) fn id_list(name: &str) -> Result<Option<Vec<i64>>> {
    let Some(v) = var(name) else {
        return Ok(None);
    };
    v.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_value(name, s, "a comma-separated list of chat ids"))
        .collect::<Result<Vec<i64>>>()
        .map(Some)
}
