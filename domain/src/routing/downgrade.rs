//! Cheap-model downgrade for short, low-information messages
//!
//! Pure cost optimization: a bare acknowledgement ("thanks", "ok") does not
//! need a flagship model, so the resolver substitutes the provider's
//! cost-efficient tier before routing. Never changes correctness.

use crate::core::model_id::{ModelId, ProviderKey};

/// Maximum byte length for a message to qualify as a short acknowledgement.
const SHORT_MESSAGE_MAX_LEN: usize = 24;

/// Canned low-information phrases, matched case-insensitively after
/// trimming surrounding whitespace and trailing punctuation.
const ACK_PHRASES: &[&str] = &[
    "ok", "okay", "k", "kk", "thanks", "thank you", "thx", "ty", "cool", "nice", "great", "got it",
    "sure", "yes", "yep", "no", "nope", "lol", "haha", "hi", "hello", "hey", "bye", "good night",
    "good morning",
];

/// Returns true when the message is a short, canned acknowledgement.
pub fn is_short_acknowledgement(message: &str) -> bool {
    if message.len() > SHORT_MESSAGE_MAX_LEN {
        return false;
    }
    let normalized = message
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .to_lowercase();
    ACK_PHRASES.contains(&normalized.as_str())
}

/// Cheaper model substituted for a flagship id on short acknowledgements.
///
/// Downgrades stay within the same provider so breaker and fallback
/// behavior is unchanged. Unknown providers are left as-is.
pub fn downgrade_model(model: &ModelId) -> Option<ModelId> {
    let target = match model.provider() {
        ProviderKey::OpenAi => "openai/gpt-5-nano",
        ProviderKey::Anthropic => "anthropic/claude-haiku-4.5",
        ProviderKey::Google => "google/gemini-3-flash-preview",
        _ => return None,
    };
    if model.as_str() == target {
        return None;
    }
    ModelId::parse(target).ok()
}
