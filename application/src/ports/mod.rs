//! Ports: interfaces the application layer depends on
//!
//! Adapters implementing these live in the infrastructure layer and are
//! injected at composition time.

pub mod breaker_state;
pub mod llm_gateway;
pub mod memory_gateway;
pub mod session_store;

pub use breaker_state::{BreakerStateSource, NoBreakers};
pub use llm_gateway::{
    CompletedCall, GatewayError, LlmGateway, LlmSession, ModelStreamEvent, StreamHandle,
};
pub use memory_gateway::{MemoryError, MemoryGateway, MemoryNote};
pub use session_store::{SessionStore, StoreError};
