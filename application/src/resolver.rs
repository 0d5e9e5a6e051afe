//! Model resolver: logical model id -> concrete, currently usable model
//!
//! The resolver is the only component that consults circuit breaker state.
//! Resolution is pure given an unchanged breaker snapshot, so resolving the
//! same id twice under the same conditions yields the same model.

use crate::ports::breaker_state::BreakerStateSource;
use council_domain::{
    CircuitState, DomainError, FallbackChains, ModelId, ProviderKey, downgrade_model,
    is_short_acknowledgement,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from model resolution, scoped to a single caller's unit
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid model identifier: {0}")]
    InvalidModelIdentifier(String),

    #[error("All providers unavailable for model: {0}")]
    AllProvidersUnavailable(String),
}

/// Outcome of a resolution, with provenance for logging and accounting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    /// The concrete model to call.
    pub model: ModelId,
    /// True when the short-message downgrade was applied.
    pub downgraded: bool,
    /// True when the fallback chain supplied the model.
    pub fell_back: bool,
}

/// Resolves logical model ids against breaker state and fallback chains
pub struct ModelResolver {
    breakers: Arc<dyn BreakerStateSource>,
    chains: FallbackChains,
}

impl ModelResolver {
    pub fn new(breakers: Arc<dyn BreakerStateSource>, chains: FallbackChains) -> Self {
        Self { breakers, chains }
    }

    /// Resolve a logical model id to a concrete, currently usable model.
    ///
    /// `short_message_hint` carries the user message when the caller wants
    /// the cheap-downgrade optimization considered; pass `None` to skip it.
    pub fn resolve(
        &self,
        logical_model_id: &str,
        short_message_hint: Option<&str>,
    ) -> Result<ResolvedModel, ResolveError> {
        let primary = ModelId::parse(logical_model_id).map_err(|e| match e {
            DomainError::InvalidModelIdentifier(id) => ResolveError::InvalidModelIdentifier(id),
            other => ResolveError::InvalidModelIdentifier(other.to_string()),
        })?;

        // Cost optimization only; never changes correctness.
        let (primary, downgraded) = match short_message_hint {
            Some(message) if is_short_acknowledgement(message) => match downgrade_model(&primary) {
                Some(cheap) => {
                    debug!(from = %logical_model_id, to = %cheap, "Downgrading short acknowledgement");
                    (cheap, true)
                }
                None => (primary, false),
            },
            _ => (primary, false),
        };

        // Common fast path: provider untracked or breaker not open.
        let provider = primary.provider();
        if self.provider_usable(&provider) {
            return Ok(ResolvedModel {
                model: primary,
                downgraded,
                fell_back: false,
            });
        }

        warn!(provider = %provider, model = %primary, "Provider breaker open, walking fallback chain");

        for candidate in self.chains.chain_for(&provider) {
            if self.provider_usable(&candidate.provider()) {
                return Ok(ResolvedModel {
                    model: candidate.clone(),
                    downgraded,
                    fell_back: true,
                });
            }
        }

        Err(ResolveError::AllProvidersUnavailable(
            primary.as_str().to_string(),
        ))
    }

    fn provider_usable(&self, provider: &ProviderKey) -> bool {
        match self.breakers.state_of(provider) {
            None => true,
            Some(state) => state.allows_requests(),
        }
    }
}
