//! Unit tests for `prompt::build_chat_messages` and `prompt::persona_system_prompt`.
//!
//! External interactions: none (pure function tests).

use prompt::{
    build_chat_messages, persona_system_prompt, ChatMessage, HistoryTurn, MessageRole,
    PLAIN_TEXT_RULE,
};

/// **Test: Without history the list is system + question.**
#[test]
fn build_without_history() {
    let messages = build_chat_messages("sys", &[], None, "привет");
    assert_eq!(
        messages,
        vec![ChatMessage::system("sys"), ChatMessage::user("привет")]
    );
}

/// **Test: History turns become alternating user/assistant messages in order.**
///
/// **Setup:** Two turns, the first answered by the bot.
/// **Expected:** system, user(a), assistant(ra), user(b), user(question).
#[test]
fn build_with_history_alternates_roles() {
    let history = vec![
        HistoryTurn::new("a", Some("ra".to_string())),
        HistoryTurn::new("b", None),
    ];
    let messages = build_chat_messages("sys", &history, None, "q");
    let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::System,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User,
            MessageRole::User
        ]
    );
    assert_eq!(messages[2].content, "ra");
    assert_eq!(messages.last().unwrap().content, "q");
}

/// **Test: Blank turns and blank replies are skipped.**
#[test]
fn build_skips_blank_turns() {
    let history = vec![
        HistoryTurn::new("  ", Some("x".to_string())),
        HistoryTurn::new("a", Some("   ".to_string())),
    ];
    let messages = build_chat_messages("sys", &history, None, "q");
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1], ChatMessage::user("a"));
}

/// **Test: Replied-to bot text is added once, right before the question.**
#[test]
fn build_adds_reply_context_once() {
    let messages = build_chat_messages("sys", &[], Some("bot said"), "why?");
    assert_eq!(messages[1], ChatMessage::assistant("bot said"));
    assert_eq!(messages[2], ChatMessage::user("why?"));

    let history = vec![HistoryTurn::new("hi", Some("bot said".to_string()))];
    let messages = build_chat_messages("sys", &history, Some("bot said"), "why?");
    let assistant_count = messages
        .iter()
        .filter(|m| m.role == MessageRole::Assistant)
        .count();
    assert_eq!(assistant_count, 1);
}

/// **Test: Persona prompt carries instructions, name, tone, date and the plain-text rule.**
#[test]
fn persona_prompt_contains_all_parts() {
    let prompt = persona_system_prompt("Толян", "ироничная", "Ты участник чата друзей.", "18.10.2026");
    assert!(prompt.starts_with("Ты участник чата друзей."));
    assert!(prompt.contains("Толян"));
    assert!(prompt.contains("ироничная"));
    assert!(prompt.contains("18.10.2026"));
    assert!(prompt.ends_with(PLAIN_TEXT_RULE));
}

/// **Test: Empty instructions do not leave a leading blank block.**
#[test]
fn persona_prompt_without_instructions() {
    let prompt = persona_system_prompt("Bot", "calm", "  ", "01.01.2026");
    assert!(prompt.starts_with("Тебя зовут Bot."));
}
