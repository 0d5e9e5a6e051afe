//! Circuit breaker state as seen by the council
//!
//! Breakers are owned and transitioned by the provider reliability layer;
//! the council only ever reads their state when resolving models.

use serde::{Deserialize, Serialize};

/// Circuit breaker state for one provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation - requests pass through
    Closed,
    /// Failures exceeded threshold - requests are rejected
    Open,
    /// Testing recovery - limited requests pass through
    HalfOpen,
}

impl CircuitState {
    /// A provider is usable for routing unless its breaker is `Open`.
    /// `HalfOpen` deliberately lets traffic through as the recovery probe.
    pub fn allows_requests(&self) -> bool {
        !matches!(self, CircuitState::Open)
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open => write!(f, "Open"),
            Self::HalfOpen => write!(f, "HalfOpen"),
        }
    }
}
