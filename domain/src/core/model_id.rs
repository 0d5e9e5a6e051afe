//! Model identifier and provider value objects
//!
//! Every model the council can call is addressed by a fully qualified
//! `provider/model` identifier (e.g. `openai/gpt-5.2`). The provider
//! prefix is what the circuit breaker board and the routing gateway key on.

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Upstream provider that hosts one or more models (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderKey {
    OpenAi,
    Anthropic,
    Google,
    Perplexity,
    Mistral,
    DeepSeek,
    /// Any provider reachable through the unified gateway but not
    /// special-cased here (e.g. `x-ai`, `moonshotai`).
    Other(String),
}

impl ProviderKey {
    pub fn as_str(&self) -> &str {
        match self {
            ProviderKey::OpenAi => "openai",
            ProviderKey::Anthropic => "anthropic",
            ProviderKey::Google => "google",
            ProviderKey::Perplexity => "perplexity",
            ProviderKey::Mistral => "mistralai",
            ProviderKey::DeepSeek => "deepseek",
            ProviderKey::Other(s) => s,
        }
    }
}

impl std::fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "openai" => ProviderKey::OpenAi,
            "anthropic" => ProviderKey::Anthropic,
            "google" => ProviderKey::Google,
            "perplexity" => ProviderKey::Perplexity,
            "mistralai" => ProviderKey::Mistral,
            "deepseek" => ProviderKey::DeepSeek,
            other => ProviderKey::Other(other.to_string()),
        })
    }
}

/// Fully qualified model identifier in `provider/model` form (Value Object)
///
/// Construction via [`ModelId::parse`] guarantees the provider prefix is
/// present, so [`provider`](ModelId::provider) is total.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelId(String);

impl ModelId {
    /// Parse a `provider/model` identifier.
    ///
    /// Fails with [`DomainError::InvalidModelIdentifier`] when the provider
    /// prefix or the model segment is missing.
    pub fn parse(s: impl Into<String>) -> Result<Self, DomainError> {
        let s = s.into();
        match s.split_once('/') {
            Some((provider, model)) if !provider.is_empty() && !model.is_empty() => {
                Ok(ModelId(s))
            }
            _ => Err(DomainError::InvalidModelIdentifier(s)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The provider prefix of this identifier.
    pub fn provider(&self) -> ProviderKey {
        // The constructor guarantees the separator exists.
        let prefix = self.0.split('/').next().unwrap_or_default();
        prefix.parse().unwrap_or(ProviderKey::Other(String::new()))
    }

    /// The bare model name without the provider prefix.
    pub fn model_name(&self) -> &str {
        self.0.split_once('/').map(|(_, m)| m).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ModelId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ModelId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ModelId::parse(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_identifier() {
        let id = ModelId::parse("openai/gpt-5.2").unwrap();
        assert_eq!(id.provider(), ProviderKey::OpenAi);
        assert_eq!(id.model_name(), "gpt-5.2");
        assert_eq!(id.to_string(), "openai/gpt-5.2");
    }

    #[test]
    fn parse_rejects_missing_prefix() {
        let err = ModelId::parse("gpt-5.2").unwrap_err();
        assert!(matches!(err, DomainError::InvalidModelIdentifier(_)));
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert!(ModelId::parse("/gpt-5.2").is_err());
        assert!(ModelId::parse("openai/").is_err());
        assert!(ModelId::parse("").is_err());
    }

    #[test]
    fn unknown_provider_maps_to_other() {
        let id = ModelId::parse("x-ai/grok-4").unwrap();
        assert_eq!(id.provider(), ProviderKey::Other("x-ai".to_string()));
    }

    #[test]
    fn model_name_keeps_nested_slashes() {
        let id = ModelId::parse("meta-llama/llama-4-maverick/fp8").unwrap();
        assert_eq!(id.model_name(), "llama-4-maverick/fp8");
    }
}
