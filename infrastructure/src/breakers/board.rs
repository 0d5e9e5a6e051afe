//! Per-provider breaker board
//!
//! Lazily creates one [`CircuitBreaker`] per provider as outcomes arrive
//! and exposes the read side through the application's
//! [`BreakerStateSource`] port. Providers with no recorded traffic stay
//! untracked and are treated as usable by the resolver.

use super::{CircuitBreaker, CircuitBreakerConfig};
use council_application::ports::breaker_state::BreakerStateSource;
use council_domain::{CircuitState, ProviderKey};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Shared board of provider breakers
pub struct ProviderBreakerBoard {
    config: CircuitBreakerConfig,
    breakers: RwLock<HashMap<ProviderKey, Arc<CircuitBreaker>>>,
}

impl ProviderBreakerBoard {
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            breakers: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }

    /// Record a successful call against the provider's breaker.
    pub fn record_success(&self, provider: &ProviderKey) {
        self.breaker_for(provider).record_success();
    }

    /// Record a failed call against the provider's breaker.
    pub fn record_failure(&self, provider: &ProviderKey) {
        self.breaker_for(provider).record_failure();
    }

    fn breaker_for(&self, provider: &ProviderKey) -> Arc<CircuitBreaker> {
        if let Ok(map) = self.breakers.read()
            && let Some(breaker) = map.get(provider)
        {
            return Arc::clone(breaker);
        }
        let mut map = match self.breakers.write() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(map.entry(provider.clone()).or_insert_with(|| {
            Arc::new(CircuitBreaker::new(provider.clone(), self.config.clone()))
        }))
    }
}

impl Default for ProviderBreakerBoard {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl BreakerStateSource for ProviderBreakerBoard {
    fn state_of(&self, provider: &ProviderKey) -> Option<CircuitState> {
        let map = match self.breakers.read() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.get(provider).map(|breaker| breaker.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn untracked_providers_have_no_state() {
        let board = ProviderBreakerBoard::with_defaults();
        assert_eq!(board.state_of(&ProviderKey::OpenAi), None);
    }

    #[test]
    fn failures_open_only_the_affected_provider() {
        let board = ProviderBreakerBoard::new(
            CircuitBreakerConfig::new()
                .with_failure_threshold(2)
                .with_reset_timeout(Duration::from_secs(300)),
        );
        board.record_failure(&ProviderKey::OpenAi);
        board.record_failure(&ProviderKey::OpenAi);
        board.record_success(&ProviderKey::Anthropic);

        assert_eq!(board.state_of(&ProviderKey::OpenAi), Some(CircuitState::Open));
        assert_eq!(
            board.state_of(&ProviderKey::Anthropic),
            Some(CircuitState::Closed)
        );
        assert_eq!(board.state_of(&ProviderKey::Google), None);
    }
}
