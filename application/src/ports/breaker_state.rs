//! Provider circuit breaker read-only port
//!
//! Breakers are owned and transitioned by the provider reliability layer;
//! the council only reads their state when resolving models. Keeping the
//! port read-only keeps failure-isolation logic here testable without
//! mocking breaker internals.

use council_domain::{CircuitState, ProviderKey};

/// Read-only view of per-provider circuit breaker state
pub trait BreakerStateSource: Send + Sync {
    /// Current breaker state for a provider, or `None` when no breaker is
    /// tracked for it (untracked providers are treated as usable).
    fn state_of(&self, provider: &ProviderKey) -> Option<CircuitState>;
}

/// Source with no tracked breakers; every provider is considered usable.
pub struct NoBreakers;

impl BreakerStateSource for NoBreakers {
    fn state_of(&self, _provider: &ProviderKey) -> Option<CircuitState> {
        None
    }
}
