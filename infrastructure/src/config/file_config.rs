//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file and
//! are deserialized directly. Conversion into runtime types (fallback
//! chains, breaker thresholds, gateway settings) happens through the
//! helper methods, which log and skip invalid entries rather than failing
//! the whole load.

use crate::breakers::CircuitBreakerConfig;
use crate::providers::OpenRouterConfig;
use council_domain::{FallbackChains, ModelId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Council behavior (`[council]`)
    pub council: FileCouncilConfig,
    /// Unified gateway connection (`[gateway]`)
    pub gateway: FileGatewayConfig,
    /// Fallback chain overrides (`[routing]`)
    pub routing: FileRoutingConfig,
    /// Provider breaker thresholds (`[breaker]`)
    pub breaker: FileBreakerConfig,
}

/// Council behavior from TOML (`[council]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Moderator model for synthesis.
    pub moderator: String,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            moderator: "openai/gpt-5.2".to_string(),
        }
    }
}

impl FileCouncilConfig {
    /// Parsed moderator id, falling back to the default when malformed.
    pub fn moderator_model(&self) -> ModelId {
        match ModelId::parse(&self.moderator) {
            Ok(model) => model,
            Err(e) => {
                warn!(error = %e, "Invalid council.moderator, using default");
                Self::default().moderator_model()
            }
        }
    }
}

/// Unified gateway connection from TOML (`[gateway]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    pub base_url: String,
    pub referer: String,
    pub title: String,
    pub max_tokens: u32,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            api_key: None,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            referer: "https://aspendos.net".to_string(),
            title: "Aspendos AI".to_string(),
            max_tokens: 8192,
        }
    }
}

impl FileGatewayConfig {
    /// API key from the config file, or from the configured env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Gateway settings with the resolved API key, `None` if no key is set.
    pub fn to_gateway_config(&self) -> Option<OpenRouterConfig> {
        let mut config = OpenRouterConfig::new(self.resolve_api_key()?);
        config.base_url = self.base_url.clone();
        config.referer = self.referer.clone();
        config.title = self.title.clone();
        config.max_tokens = self.max_tokens;
        Some(config)
    }
}

/// Fallback routing from TOML (`[routing]` section)
///
/// Keys are provider names (`openai`, `anthropic`, ...), values are ordered
/// lists of full model ids to try when the provider's breaker is open.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoutingConfig {
    pub fallbacks: HashMap<String, Vec<String>>,
}

impl FileRoutingConfig {
    /// Chains built from the standard defaults plus file overrides.
    /// Malformed model ids are logged and skipped.
    pub fn to_fallback_chains(&self) -> FallbackChains {
        let mut chains = FallbackChains::standard();
        for (provider, models) in &self.fallbacks {
            let parsed: Vec<ModelId> = models
                .iter()
                .filter_map(|id| match ModelId::parse(id) {
                    Ok(model) => Some(model),
                    Err(e) => {
                        warn!(provider, model = id, error = %e, "Skipping invalid fallback model");
                        None
                    }
                })
                .collect();
            let key = provider
                .parse::<council_domain::ProviderKey>()
                .unwrap_or_else(|never| match never {});
            chains.set(key, parsed);
        }
        chains
    }
}

/// Breaker thresholds from TOML (`[breaker]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub reset_timeout_secs: u64,
    pub failure_window_secs: u64,
}

impl Default for FileBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            reset_timeout_secs: 30,
            failure_window_secs: 60,
        }
    }
}

impl FileBreakerConfig {
    pub fn to_breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig::new()
            .with_failure_threshold(self.failure_threshold)
            .with_success_threshold(self.success_threshold)
            .with_reset_timeout(Duration::from_secs(self.reset_timeout_secs))
            .with_failure_window(Duration::from_secs(self.failure_window_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::ProviderKey;

    #[test]
    fn defaults_cover_every_section() {
        let config = FileConfig::default();
        assert_eq!(config.council.moderator, "openai/gpt-5.2");
        assert_eq!(config.gateway.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.breaker.failure_threshold, 5);
        assert!(config.routing.fallbacks.is_empty());
    }

    #[test]
    fn malformed_moderator_falls_back_to_default() {
        let council = FileCouncilConfig {
            moderator: "not-a-model-id".to_string(),
        };
        assert_eq!(council.moderator_model().as_str(), "openai/gpt-5.2");
    }

    #[test]
    fn fallback_overrides_replace_the_standard_chain() {
        let mut fallbacks = HashMap::new();
        fallbacks.insert(
            "openai".to_string(),
            vec![
                "mistral/mistral-large".to_string(),
                "bad id".to_string(),
                "google/gemini-3-flash-preview".to_string(),
            ],
        );
        let routing = FileRoutingConfig { fallbacks };
        let chains = routing.to_fallback_chains();

        let chain = chains.chain_for(&ProviderKey::OpenAi);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].as_str(), "mistral/mistral-large");
        // Untouched providers keep the standard chain.
        assert!(!chains.chain_for(&ProviderKey::Anthropic).is_empty());
    }

    #[test]
    fn breaker_section_maps_to_runtime_config() {
        let file = FileBreakerConfig {
            failure_threshold: 3,
            success_threshold: 1,
            reset_timeout_secs: 10,
            failure_window_secs: 20,
        };
        let config = file.to_breaker_config();
        assert_eq!(config.failure_threshold, 3);
        assert_eq!(config.reset_timeout, Duration::from_secs(10));
    }
}
