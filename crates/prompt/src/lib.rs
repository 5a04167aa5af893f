//! # Prompt
//!
//! Builds the message list sent to the AI provider.
//!
//! ## Order
//!
//! System (persona instructions) → recent context as alternating user/assistant turns →
//! optional replied-to bot message → current question (last, role user).
//!
//! ## External interactions
//!
//! - **AI models**: output is sent to OpenAI-compatible chat completion APIs.

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// One recorded exchange: what a user wrote and, if the bot answered, its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTurn {
    pub text: String,
    pub reply: Option<String>,
}

impl HistoryTurn {
    pub fn new(text: impl Into<String>, reply: Option<String>) -> Self {
        Self {
            text: text.into(),
            reply,
        }
    }
}

/// Appended to every persona prompt: replies go to Telegram as plain text.
pub const PLAIN_TEXT_RULE: &str =
    "Не используй Markdown и символы форматирования (*, _, `, #). Пиши обычным текстом.";

/// Formats the persona system prompt.
///
/// `instructions` is the free-form persona description; `today` is a preformatted date
/// (the model otherwise has no idea what day it is).
pub fn persona_system_prompt(name: &str, tone: &str, instructions: &str, today: &str) -> String {
    let mut out = String::new();
    let instructions = instructions.trim();
    if !instructions.is_empty() {
        out.push_str(instructions);
        out.push_str("\n\n");
    }
    out.push_str(&format!("Тебя зовут {}. Манера общения: {}.\n", name, tone));
    out.push_str(&format!("Сегодня {}.\n", today));
    out.push_str(PLAIN_TEXT_RULE);
    out
}

/// Builds the full message list for one completion request.
///
/// Empty history turns are skipped. When `reply_context` is given and is not already the last
/// assistant message, it is added as an assistant turn right before the question.
pub fn build_chat_messages(
    system: &str,
    history: &[HistoryTurn],
    reply_context: Option<&str>,
    question: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 3);
    messages.push(ChatMessage::system(system));

    for turn in history {
        if turn.text.trim().is_empty() {
            continue;
        }
        messages.push(ChatMessage::user(turn.text.trim()));
        if let Some(reply) = turn.reply.as_deref().filter(|r| !r.trim().is_empty()) {
            messages.push(ChatMessage::assistant(reply.trim()));
        }
    }

    if let Some(ctx) = reply_context.map(str::trim).filter(|c| !c.is_empty()) {
        let already_last = messages
            .last()
            .map(|m| m.role == MessageRole::Assistant && m.content == ctx)
            .unwrap_or(false);
        if !already_last {
            messages.push(ChatMessage::assistant(ctx));
        }
    }

    messages.push(ChatMessage::user(question));
    messages
}
