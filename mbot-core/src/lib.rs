//! # mbot-core
//!
//! Core types and traits for the bot: [`Bot`], [`Handler`], [`Middleware`], message/user/chat types,
//! the [`BotError`] taxonomy and tracing initialization. Transport-agnostic; used by the dispatcher,
//! the Telegram adapter and the application crate.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::Bot;
pub use error::{BotError, Result};
pub use logger::init_tracing;
pub use types::{Chat, Handler, HandlerResponse, Message, Middleware, ToCoreMessage, ToCoreUser, User};
