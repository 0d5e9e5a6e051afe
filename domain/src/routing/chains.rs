//! Static fallback chains consulted when a provider's breaker is open

use crate::core::model_id::{ModelId, ProviderKey};
use std::collections::HashMap;

/// Ordered alternative models per provider, consulted only when the
/// primary model's provider breaker is `Open`.
#[derive(Debug, Clone, Default)]
pub struct FallbackChains {
    chains: HashMap<ProviderKey, Vec<ModelId>>,
}

impl FallbackChains {
    /// Build an empty chain table (no fallbacks configured).
    pub fn empty() -> Self {
        Self::default()
    }

    /// The product's stock chains: each first-party provider falls back
    /// across the other two flagship providers' default models.
    pub fn standard() -> Self {
        let gpt = ModelId::parse("openai/gpt-5.2").expect("static model id");
        let sonnet = ModelId::parse("anthropic/claude-sonnet-4.5").expect("static model id");
        let flash = ModelId::parse("google/gemini-3-flash-preview").expect("static model id");

        let mut chains = HashMap::new();
        chains.insert(ProviderKey::OpenAi, vec![sonnet.clone(), flash.clone()]);
        chains.insert(ProviderKey::Anthropic, vec![gpt.clone(), flash.clone()]);
        chains.insert(ProviderKey::Google, vec![gpt, sonnet]);
        Self { chains }
    }

    /// Replace the chain for one provider.
    pub fn set(&mut self, provider: ProviderKey, chain: Vec<ModelId>) {
        self.chains.insert(provider, chain);
    }

    /// The configured chain for a provider, empty when none is set.
    pub fn chain_for(&self, provider: &ProviderKey) -> &[ModelId] {
        self.chains.get(provider).map(Vec::as_slice).unwrap_or(&[])
    }
}
