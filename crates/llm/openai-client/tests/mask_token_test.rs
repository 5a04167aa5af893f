//! Unit tests for [`openai_client::mask_token`] and [`openai_client::CompletionParams`].
//!
//! API keys are masked for safe logging: first 7 chars + `***` + last 4 chars.
//! Keys of length ≤ 11 are fully masked as `***` to avoid leaking any segment.

use openai_client::{mask_token, CompletionParams};

/// **Test: Short or empty tokens are fully masked.**
///
/// **Expected:** Any token of length ≤ 11 returns `"***"` (no prefix/suffix shown).
#[test]
fn mask_token_short_returns_all_star() {
    assert_eq!(mask_token(""), "***");
    assert_eq!(mask_token("a"), "***");
    assert_eq!(mask_token("sk-12345"), "***");
    assert_eq!(mask_token("sk-proj-12"), "***");
}

/// **Test: Long tokens show first 7 and last 4 characters.**
#[test]
fn mask_token_long_shows_head_and_tail() {
    assert_eq!(mask_token("sk-proj-abcdefghijklmnop"), "sk-proj***mnop");
    assert_eq!(mask_token("sk-proj-xyzw"), "sk-proj***xyzw");
}

/// **Test: Typical DeepSeek key format.**
///
/// **Expected:** Masked string keeps the `sk-` prefix, ends with last 4 chars, total length 14.
#[test]
fn mask_token_typical_deepseek_key() {
    let key = "sk-0123456789abcdef0123456789abcdef";
    let masked = mask_token(key);
    assert!(masked.starts_with("sk-0123"));
    assert!(masked.ends_with("cdef"));
    assert_eq!(masked.len(), 7 + 3 + 4);
}

/// **Test: Non-ASCII tokens are masked on character boundaries.**
#[test]
fn mask_token_non_ascii_does_not_panic() {
    let masked = mask_token("ключключключключ");
    assert_eq!(masked, "ключклю***ключ");
}

/// **Test: Default sampling parameters match the bot's generation settings.**
#[test]
fn completion_params_default() {
    let params = CompletionParams::default();
    assert_eq!(params.max_tokens, 999);
    assert!((params.temperature - 1.5).abs() < f32::EPSILON);
}
