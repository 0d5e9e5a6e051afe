//! Infrastructure layer for aspendos-council
//!
//! Adapters implementing the ports defined in the application layer:
//! the unified model gateway, session and memory stores, the provider
//! breaker board, and configuration file loading.

pub mod breakers;
pub mod config;
pub mod memory;
pub mod providers;
pub mod stores;

// Re-export commonly used types
pub use breakers::{CircuitBreaker, CircuitBreakerConfig, ProviderBreakerBoard};
pub use config::{ConfigLoader, FileConfig};
pub use memory::InMemoryMemoryGateway;
pub use providers::{BreakerRecordingGateway, OpenRouterConfig, OpenRouterGateway};
pub use stores::InMemorySessionStore;
