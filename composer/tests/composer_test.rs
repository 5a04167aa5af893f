//! Response composer with a scripted in-process LLM client.
//!
//! Covers AI success (prompt assembly, trimming), fallback on error / timeout / empty output,
//! trigger-phrase pools and the morning greeting.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Utc, Weekday};
use composer::{
    ComposerConfig, Persona, PhrasePool, ReplySource, ResponseComposer, TriggerKind,
    DEFAULT_GREETING,
};
use llm_client::LlmClient;
use prompt::{ChatMessage, MessageRole};
use storage::MessageRecord;

enum Script {
    Reply(&'static str),
    Fail,
    Hang,
}

struct ScriptedLlm {
    script: Script,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedLlm {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn get_llm_response_with_messages(
        &self,
        messages: Vec<ChatMessage>,
    ) -> anyhow::Result<String> {
        self.seen.lock().unwrap().push(messages);
        match self.script {
            Script::Reply(text) => Ok(text.to_string()),
            Script::Fail => Err(anyhow::anyhow!("HTTP 503 upstream exploded")),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("too late".to_string())
            }
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn config() -> ComposerConfig {
    let mut triggers = HashMap::new();
    triggers.insert(
        "Летал?".to_string(),
        PhrasePool::new(strings(&["летал", "не летал"]), strings(&["улетел"])),
    );
    ComposerConfig {
        persona: Persona {
            name: "Толян".to_string(),
            tone: "ироничная".to_string(),
            instructions: "Ты участник чата.".to_string(),
        },
        fallback: PhrasePool::new(strings(&["позже", "не сейчас"]), strings(&["без комментариев"])),
        triggers,
        timeout: Duration::from_secs(20),
        ..ComposerConfig::default()
    }
}

fn record(text: &str, reply: Option<&str>) -> MessageRecord {
    MessageRecord {
        id: 1,
        chat_id: -100123,
        user_id: 55,
        message_id: "1".to_string(),
        text: text.to_string(),
        reply: reply.map(str::to_string),
        reset_id: 0,
        created_at: Utc::now(),
    }
}

fn fallback_members() -> Vec<String> {
    strings(&["позже", "не сейчас", "без комментариев"])
}

/// **Test: successful AI call returns trimmed text and a prompt in persona → context → question order.**
#[tokio::test]
async fn test_ai_reply_with_context() {
    let llm = ScriptedLlm::new(Script::Reply("  ответ  \n"));
    let composer = ResponseComposer::with_seed(llm.clone(), config(), 1);
    let recent = vec![record("как дела?", Some("норм")), record("а погода?", None)];

    let reply = composer
        .compose_reply("привет", &recent, Some("норм"), &TriggerKind::Mention)
        .await;

    assert_eq!(reply.text, "ответ");
    assert_eq!(reply.source, ReplySource::Ai);

    let seen = llm.seen.lock().unwrap();
    let messages = &seen[0];
    assert_eq!(messages[0].role, MessageRole::System);
    assert!(messages[0].content.contains("Толян"));
    assert_eq!(messages[1], ChatMessage::user("как дела?"));
    assert_eq!(messages[2], ChatMessage::assistant("норм"));
    assert_eq!(messages[3], ChatMessage::user("а погода?"));
    assert_eq!(messages[4], ChatMessage::assistant("норм"));
    assert_eq!(messages.last().unwrap(), &ChatMessage::user("привет"));
}

/// **Test: AI timeout for "привет" yields one of the fallback phrases.**
///
/// **Setup:** LLM that never answers within the 20 s timeout (paused time).
/// **Expected:** reply is a member of the fallback pool, source Fallback.
#[tokio::test(start_paused = true)]
async fn test_timeout_falls_back_to_pool() {
    let composer = ResponseComposer::with_seed(ScriptedLlm::new(Script::Hang), config(), 3);

    let reply = composer
        .compose_reply("привет", &[], None, &TriggerKind::Mention)
        .await;

    assert_eq!(reply.source, ReplySource::Fallback);
    assert!(fallback_members().contains(&reply.text), "got {}", reply.text);
}

/// **Test: provider error text never reaches the reply.**
#[tokio::test]
async fn test_provider_error_is_not_surfaced() {
    let composer = ResponseComposer::with_seed(ScriptedLlm::new(Script::Fail), config(), 5);
    for _ in 0..20 {
        let reply = composer
            .compose_reply("что нового?", &[], None, &TriggerKind::Mention)
            .await;
        assert!(!reply.text.contains("503"));
        assert!(fallback_members().contains(&reply.text));
    }
}

/// **Test: empty AI output and empty questions use the pool.**
#[tokio::test]
async fn test_empty_output_and_empty_question() {
    let llm = ScriptedLlm::new(Script::Reply("   "));
    let composer = ResponseComposer::with_seed(llm.clone(), config(), 9);

    let reply = composer
        .compose_reply("вопрос", &[], None, &TriggerKind::Mention)
        .await;
    assert_eq!(reply.source, ReplySource::Fallback);

    let reply = composer
        .compose_reply("  ", &[], None, &TriggerKind::Mention)
        .await;
    assert_eq!(reply.source, ReplySource::Fallback);
    assert_eq!(llm.seen.lock().unwrap().len(), 1);
}

/// **Test: trigger phrases pick from their own pool; rare probability 1.0 always picks rare.**
#[tokio::test]
async fn test_trigger_pools() {
    let llm = ScriptedLlm::new(Script::Fail);
    let composer = ResponseComposer::with_seed(llm.clone(), config(), 11);
    let kind = TriggerKind::Phrase("летал?".to_string());
    for _ in 0..20 {
        let text = composer.pick(&kind);
        assert!(strings(&["летал", "не летал", "улетел"]).contains(&text));
    }

    let always_rare = ResponseComposer::with_seed(
        llm.clone(),
        ComposerConfig {
            rare_probability: 1.0,
            ..config()
        },
        11,
    );
    assert_eq!(always_rare.pick(&kind), "улетел");

    let unknown = composer.pick(&TriggerKind::Phrase("нет такого".to_string()));
    assert!(fallback_members().contains(&unknown));
    assert!(llm.seen.lock().unwrap().is_empty());
}

/// **Test: the greeting uses the weekday prompt and falls back to the default wish.**
#[tokio::test]
async fn test_greeting() {
    let llm = ScriptedLlm::new(Script::Reply("Хорошей пятницы! 🎉"));
    let composer = ResponseComposer::with_seed(llm.clone(), config(), 2);
    let reply = composer.compose_greeting(Weekday::Fri).await;
    assert_eq!(reply.text, "Хорошей пятницы! 🎉");
    let prompt = &llm.seen.lock().unwrap()[0];
    assert!(prompt.last().unwrap().content.contains("пятница"));

    let composer = ResponseComposer::with_seed(ScriptedLlm::new(Script::Fail), config(), 2);
    let reply = composer.compose_greeting(Weekday::Mon).await;
    assert_eq!(reply.text, DEFAULT_GREETING);
    assert_eq!(reply.source, ReplySource::Fallback);
}
