//! # Dispatcher
//!
//! Selects exactly one handler for each incoming update and runs middleware around it.
//!
//! Priority: command prefix > bot mention (or reply to the bot) > trigger phrase > general handler
//! (allow-listed chats only). Updates that match nothing are ignored without touching any state:
//! middleware `before` only runs once a route was selected, and the statistics middleware counts
//! the message there, before the handler runs.

mod route;

pub use route::{extract_question, is_bot_mentioned, parse_command, ParsedCommand, Route};

use mbot_core::{Bot, Handler, HandlerResponse, Message, Middleware, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// Route table plus middleware. Cheap to share behind an `Arc`.
pub struct Dispatcher {
    middleware: Vec<Arc<dyn Middleware>>,
    commands: HashMap<String, Arc<dyn Handler>>,
    mention: Option<Arc<dyn Handler>>,
    triggers: Vec<(String, Arc<dyn Handler>)>,
    general: Option<Arc<dyn Handler>>,
    allowed_chats: HashSet<i64>,
    bot_username: Arc<RwLock<Option<String>>>,
}

impl Dispatcher {
    /// Creates an empty dispatcher. `bot_username` is filled by the runner after `getMe`.
    pub fn new(bot_username: Arc<RwLock<Option<String>>>) -> Self {
        Self {
            middleware: Vec::new(),
            commands: HashMap::new(),
            mention: None,
            triggers: Vec::new(),
            general: None,
            allowed_chats: HashSet::new(),
            bot_username,
        }
    }

    /// Appends a middleware (before in order, after in reverse).
    pub fn add_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Registers a `/name` command (case-insensitive, without the slash).
    pub fn command(mut self, name: &str, handler: Arc<dyn Handler>) -> Self {
        self.commands
            .insert(name.trim_start_matches('/').to_lowercase(), handler);
        self
    }

    pub fn mention(mut self, handler: Arc<dyn Handler>) -> Self {
        self.mention = Some(handler);
        self
    }

    /// Registers a whole-message trigger phrase (case-insensitive).
    pub fn trigger(mut self, phrase: &str, handler: Arc<dyn Handler>) -> Self {
        self.triggers.push((phrase.trim().to_lowercase(), handler));
        self
    }

    pub fn general(mut self, handler: Arc<dyn Handler>) -> Self {
        self.general = Some(handler);
        self
    }

    pub fn allow_chats(mut self, chats: impl IntoIterator<Item = i64>) -> Self {
        self.allowed_chats.extend(chats);
        self
    }

    pub fn is_allowed(&self, chat_id: i64) -> bool {
        self.allowed_chats.contains(&chat_id)
    }

    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Picks the handler for `message` by priority, or `None` if the update must be ignored.
    pub async fn select(&self, message: &Message) -> Option<(Route, Arc<dyn Handler>)> {
        let text = message.content.trim();
        if text.is_empty() {
            return None;
        }
        let bot_username = self.bot_username.read().await.clone();

        if let Some(cmd) = parse_command(text) {
            let addressed_to_us = match (cmd.target, bot_username.as_deref()) {
                (Some(target), Some(me)) => target.eq_ignore_ascii_case(me),
                _ => true,
            };
            if addressed_to_us {
                if let Some(handler) = self.commands.get(&cmd.name) {
                    return Some((Route::Command(cmd.name), handler.clone()));
                }
            }
        }

        if let Some(handler) = &self.mention {
            let mentioned = bot_username
                .as_deref()
                .map(|me| is_bot_mentioned(text, me))
                .unwrap_or(false);
            let replied_to_bot =
                message.reply_to_message_id.is_some() && message.reply_to_message_from_bot;
            if mentioned || replied_to_bot {
                return Some((Route::Mention, handler.clone()));
            }
        }

        let lowered = text.to_lowercase();
        if let Some((phrase, handler)) = self.triggers.iter().find(|(p, _)| *p == lowered) {
            return Some((Route::Trigger(phrase.clone()), handler.clone()));
        }

        if self.is_allowed(message.chat.id) {
            if let Some(handler) = &self.general {
                return Some((Route::General, handler.clone()));
            }
        }

        None
    }

    /// Runs middleware before, the selected handler, then middleware after in reverse.
    ///
    /// Returns `Ignore` when no route matched. A handler error is logged and returned after the
    /// middleware `after` phase ran with `Stop`.
    #[instrument(skip(self, message), fields(chat_id = message.chat.id, user_id = message.user.id))]
    pub async fn dispatch(&self, message: &Message) -> Result<HandlerResponse> {
        let Some((route, handler)) = self.select(message).await else {
            debug!(message_id = %message.id, "step: no route matched, update ignored");
            return Ok(HandlerResponse::Ignore);
        };

        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            message_id = %message.id,
            route = %route,
            "step: dispatch started"
        );

        for mw in &self.middleware {
            let mw_name = std::any::type_name_of_val(mw.as_ref());
            let should_continue = mw.before(message).await?;
            if !should_continue {
                info!(
                    user_id = message.user.id,
                    middleware = %mw_name,
                    "step: middleware before returned false, dispatch stopped"
                );
                return Ok(HandlerResponse::Stop);
            }
        }

        let (response, failure) = match handler.handle(message).await {
            Ok(response) => (response, None),
            Err(e) => {
                error!(error = %e, route = %route, user_id = message.user.id, "Handler failed");
                (HandlerResponse::Stop, Some(e))
            }
        };

        let reply_len = response.reply_text().map(str::len);
        info!(
            user_id = message.user.id,
            route = %route,
            reply_len = ?reply_len,
            "step: handler done"
        );

        for mw in self.middleware.iter().rev() {
            if let Err(e) = mw.after(message, &response).await {
                let mw_name = std::any::type_name_of_val(mw.as_ref());
                warn!(error = %e, middleware = %mw_name, "Middleware after failed");
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(response),
        }
    }

    /// Dispatches `message` and sends the reply through `bot`. Errors are logged, never returned,
    /// so one failing update does not stop the receive loop.
    pub async fn process(&self, bot: &dyn Bot, message: &Message) {
        match self.dispatch(message).await {
            Ok(HandlerResponse::Reply(text)) => {
                if let Err(e) = bot.reply_to(message, &text).await {
                    error!(error = %e, chat_id = message.chat.id, "Failed to send reply");
                }
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, chat_id = message.chat.id, user_id = message.user.id, "Update processing failed");
            }
        }
    }
}
