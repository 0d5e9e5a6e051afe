//! Provider reliability layer
//!
//! One circuit breaker per provider, fed by gateway call outcomes and read
//! by the model resolver through the application's read-only port.

mod board;
mod breaker;

pub use board::ProviderBreakerBoard;
pub use breaker::{CircuitBreaker, CircuitBreakerConfig};
