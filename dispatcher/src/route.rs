//! Route selection helpers: command parsing and @-mention detection.
//!
//! Pure functions; the dispatcher and the AI handler share them so both agree on what a
//! mention or a command is.

use std::fmt;

/// Which priority level selected the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/name` command (lowercased, without the slash and `@bot` suffix).
    Command(String),
    /// The bot was @-mentioned or the message replies to the bot.
    Mention,
    /// Whole message equals a configured trigger phrase (lowercased).
    Trigger(String),
    /// Fallback for allow-listed chats.
    General,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Command(name) => write!(f, "command:/{}", name),
            Route::Mention => f.write_str("mention"),
            Route::Trigger(phrase) => write!(f, "trigger:{}", phrase),
            Route::General => f.write_str("general"),
        }
    }
}

/// A parsed `/command@target args` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    pub name: String,
    pub target: Option<&'a str>,
    pub args: &'a str,
}

/// Parses the leading command token. The name must be followed by end of text or whitespace;
/// `/start@mybot` yields target `Some("mybot")`.
pub fn parse_command(text: &str) -> Option<ParsedCommand<'_>> {
    let text = text.trim_start();
    let rest = text.strip_prefix('/')?;
    let token_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let (token, args) = rest.split_at(token_end);
    let (name, target) = match token.split_once('@') {
        Some((name, target)) => (name, Some(target)),
        None => (token, None),
    };
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(ParsedCommand {
        name: name.to_lowercase(),
        target,
        args: args.trim(),
    })
}

/// Returns true if `text` contains a @mention of the given bot username (case-insensitive).
pub fn is_bot_mentioned(text: &str, bot_username: &str) -> bool {
    if bot_username.is_empty() {
        return false;
    }
    text.to_lowercase()
        .contains(&format!("@{}", bot_username.to_lowercase()))
}

/// Strips every @mention of the bot from `text` and returns the trimmed remainder.
pub fn extract_question(text: &str, bot_username: &str) -> String {
    let needle = format!("@{}", bot_username.to_lowercase());
    let lower = text.to_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    // Lowercasing may change byte lengths for some scripts; fall back to exact replace then.
    if lower.len() != text.len() {
        return text
            .replace(&format!("@{}", bot_username), "")
            .trim()
            .to_string();
    }
    while let Some(pos) = lower[cursor..].find(&needle) {
        let start = cursor + pos;
        out.push_str(&text[cursor..start]);
        cursor = start + needle.len();
    }
    out.push_str(&text[cursor..]);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
