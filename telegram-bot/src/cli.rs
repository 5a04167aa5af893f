//! CLI parser and config loading.

use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::BotConfig;

#[derive(Parser)]
#[command(name = "mbot")]
#[command(about = "Group chat bot: AI replies, morning digest, statistics", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Export stored message history to CSV once and exit.
    Export {
        /// Only messages of the last N hours (default: everything stored).
        #[arg(long)]
        hours: Option<u64>,
        /// Output directory (default: EXPORT_DIR).
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

/// Load BotConfig from environment. If `token` is provided it overrides BOT_TOKEN.
pub fn load_config(token: Option<String>) -> anyhow::Result<BotConfig> {
    Ok(BotConfig::load(token)?)
}

/// Start of the `mbot export` window: `hours` before `now`, or the Unix epoch when `None`.
pub fn export_since(hours: Option<u64>, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let Some(h) = hours else {
        // Unix epoch.
        return Ok(DateTime::<Utc>::default());
    };
    i64::try_from(h)
        .ok()
        .and_then(Duration::try_hours)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| anyhow!("--hours {} is out of range", h))
}
