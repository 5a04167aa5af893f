//! # Composer
//!
//! Turns an incoming question into a reply in the bot's persona.
//!
//! The AI provider is called with a bounded timeout; on error, timeout or an empty answer the
//! reply comes from a canned-phrase pool chosen by [`TriggerKind`]. [`ResponseComposer`] never
//! returns an error and never surfaces provider error text to the chat.

mod composer;
mod persona;

pub use composer::{ComposedReply, ComposerConfig, ReplySource, ResponseComposer, LAST_RESORT_PHRASE};
pub use persona::{greeting_prompt, Persona, PhrasePool, TriggerKind, DEFAULT_GREETING};
