//! Receive loop: converts teloxide messages to core messages and hands them to the dispatcher.
//!
//! Each update is awaited inside the teloxide handler instead of being detached with
//! `tokio::spawn`; teloxide serialises updates per chat, so one chat's messages are handled in
//! receipt order while different chats still run concurrently.

use anyhow::Result;
use dispatcher::Dispatcher;
use mbot_core::{Bot as CoreBot, ToCoreMessage};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::UserId;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use super::adapters::TelegramMessageWrapper;

/// Calls `getMe`, stores the bot username used for mention and `/cmd@bot` matching and returns
/// the bot's user id, which identifies replies to our own messages.
pub async fn fetch_bot_identity(
    bot: &teloxide::Bot,
    bot_username: &RwLock<Option<String>>,
) -> Option<UserId> {
    match bot.get_me().await {
        Ok(me) => {
            if let Some(username) = &me.user.username {
                *bot_username.write().await = Some(username.clone());
                info!(username = %username, bot_id = me.user.id.0, "Bot identity set");
            }
            Some(me.user.id)
        }
        Err(e) => {
            warn!(error = %e, "getMe failed; only commands and trigger phrases will be answered");
            None
        }
    }
}

/// Starts long polling until Ctrl-C. Text messages are dispatched and replies sent via `responder`.
#[instrument(skip(bot, dispatcher, responder, bot_username))]
pub async fn run_repl(
    bot: teloxide::Bot,
    dispatcher: Arc<Dispatcher>,
    responder: Arc<dyn CoreBot>,
    bot_username: Arc<RwLock<Option<String>>>,
) -> Result<()> {
    let bot_id = fetch_bot_identity(&bot, &bot_username).await;

    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let dispatcher = dispatcher.clone();
        let responder = responder.clone();

        async move {
            let Some(text) = msg.text() else {
                return Ok(());
            };
            let core_msg = TelegramMessageWrapper::new(&msg, bot_id).to_core();
            info!(
                user_id = core_msg.user.id,
                chat_id = core_msg.chat.id,
                message_content = %text,
                "Received message"
            );

            dispatcher.process(responder.as_ref(), &core_msg).await;
            Ok(())
        }
    })
    .await;

    info!("Receive loop stopped");
    Ok(())
}
