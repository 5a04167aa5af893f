//! # Telegram bot application
//!
//! Wires the dispatcher, statistics middleware, command and AI handlers, feeds, the response
//! composer and scheduled jobs. Loads config from env, runs the receive loop and the scheduler.

pub mod cli;
pub mod components;
pub mod config;
pub mod format;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod runner;

/// Version reported by `/start`, `/version` and the startup notification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cli::{export_since, load_config, Cli, Commands};
pub use components::{build_bot_components, build_dispatcher, BotComponents};
pub use config::BotConfig;
pub use jobs::register_jobs;
pub use middleware::StatsMiddleware;
pub use runner::{run_bot, run_export};
