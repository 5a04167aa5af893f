use chrono::{Utc, Weekday};
use chrono_tz::Tz;
use llm_client::LlmClient;
use prompt::{build_chat_messages, persona_system_prompt, HistoryTurn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storage::MessageRecord;
use tracing::{debug, info, instrument, warn};

use crate::persona::{greeting_prompt, Persona, PhrasePool, TriggerKind, DEFAULT_GREETING};

/// Used only when every configured pool is empty.
pub const LAST_RESORT_PHRASE: &str = "🤷";

#[derive(Debug, Clone)]
pub struct ComposerConfig {
    pub persona: Persona,
    /// Pool for AI failures on mentions and for unknown trigger phrases.
    pub fallback: PhrasePool,
    pub greeting: PhrasePool,
    /// Per trigger phrase, keyed lowercase.
    pub triggers: HashMap<String, PhrasePool>,
    pub rare_probability: f64,
    pub timeout: Duration,
    pub timezone: Tz,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            persona: Persona::default(),
            fallback: PhrasePool::default(),
            greeting: PhrasePool::new(vec![DEFAULT_GREETING.to_string()], Vec::new()),
            triggers: HashMap::new(),
            rare_probability: 0.1,
            timeout: Duration::from_secs(20),
            timezone: chrono_tz::Europe::Moscow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Ai,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedReply {
    pub text: String,
    pub source: ReplySource,
}

impl ComposedReply {
    fn fallback(text: String) -> Self {
        Self {
            text,
            source: ReplySource::Fallback,
        }
    }
}

pub struct ResponseComposer {
    llm: Arc<dyn LlmClient>,
    config: ComposerConfig,
    rng: Mutex<StdRng>,
}

impl ResponseComposer {
    pub fn new(llm: Arc<dyn LlmClient>, config: ComposerConfig) -> Self {
        Self::with_rng(llm, config, StdRng::from_entropy())
    }

    /// Deterministic phrase selection for tests.
    pub fn with_seed(llm: Arc<dyn LlmClient>, config: ComposerConfig, seed: u64) -> Self {
        Self::with_rng(llm, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(llm: Arc<dyn LlmClient>, mut config: ComposerConfig, rng: StdRng) -> Self {
        config.triggers = config
            .triggers
            .into_iter()
            .map(|(phrase, pool)| (phrase.trim().to_lowercase(), pool))
            .collect();
        Self {
            llm,
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Canned reply for `kind`, without calling the AI. Never empty.
    pub fn pick(&self, kind: &TriggerKind) -> String {
        let pool = match kind {
            TriggerKind::Mention => &self.config.fallback,
            TriggerKind::Phrase(phrase) => self
                .config
                .triggers
                .get(&phrase.to_lowercase())
                .filter(|p| !p.is_empty())
                .unwrap_or(&self.config.fallback),
            TriggerKind::Greeting => &self.config.greeting,
        };

        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        pool.pick(&mut *rng, self.config.rare_probability)
            .or_else(|| {
                self.config
                    .fallback
                    .pick(&mut *rng, self.config.rare_probability)
            })
            .unwrap_or(LAST_RESORT_PHRASE)
            .to_string()
    }

    fn system_prompt(&self) -> String {
        let today = Utc::now()
            .with_timezone(&self.config.timezone)
            .format("%d.%m.%Y")
            .to_string();
        let persona = &self.config.persona;
        persona_system_prompt(&persona.name, &persona.tone, &persona.instructions, &today)
    }

    /// Asks the AI with the configured timeout; `None` on error, timeout or empty output.
    async fn ask(&self, history: &[HistoryTurn], reply_context: Option<&str>, question: &str) -> Option<String> {
        let messages = build_chat_messages(&self.system_prompt(), history, reply_context, question);
        debug!(messages = messages.len(), "Requesting AI completion");

        match tokio::time::timeout(
            self.config.timeout,
            self.llm.get_llm_response_with_messages(messages),
        )
        .await
        {
            Ok(Ok(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    warn!(provider = "ai", "AI returned empty output, using fallback");
                    None
                } else {
                    Some(text.to_string())
                }
            }
            Ok(Err(e)) => {
                warn!(provider = "ai", error = %e, "AI request failed, using fallback");
                None
            }
            Err(_) => {
                warn!(
                    provider = "ai",
                    timeout_secs = self.config.timeout.as_secs(),
                    "AI request timed out, using fallback"
                );
                None
            }
        }
    }

    /// Reply to `question` given the recent chat records (oldest first) and the text of the bot
    /// message being replied to, if any.
    #[instrument(skip(self, recent, reply_context), fields(recent = recent.len()))]
    pub async fn compose_reply(
        &self,
        question: &str,
        recent: &[MessageRecord],
        reply_context: Option<&str>,
        kind: &TriggerKind,
    ) -> ComposedReply {
        let question = question.trim();
        if question.is_empty() {
            return ComposedReply::fallback(self.pick(kind));
        }

        let history: Vec<HistoryTurn> = recent
            .iter()
            .map(|r| HistoryTurn::new(r.text.clone(), r.reply.clone()))
            .collect();

        match self.ask(&history, reply_context, question).await {
            Some(text) => {
                info!(reply_len = text.chars().count(), "AI reply composed");
                ComposedReply {
                    text,
                    source: ReplySource::Ai,
                }
            }
            None => ComposedReply::fallback(self.pick(kind)),
        }
    }

    /// Morning wish for `weekday`; falls back to the greeting pool.
    #[instrument(skip(self))]
    pub async fn compose_greeting(&self, weekday: Weekday) -> ComposedReply {
        match self.ask(&[], None, &greeting_prompt(weekday)).await {
            Some(text) => ComposedReply {
                text,
                source: ReplySource::Ai,
            },
            None => ComposedReply::fallback(self.pick(&TriggerKind::Greeting)),
        }
    }
}
