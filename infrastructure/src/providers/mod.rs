//! Provider gateway adapters
//!
//! The unified gateway speaks the OpenAI-compatible chat completions API
//! and accepts full `provider/model` identifiers, so one adapter covers
//! every provider. [`BreakerRecordingGateway`] wraps it to feed call
//! outcomes into the per-provider breaker board.

mod openrouter;
mod recording;

pub use openrouter::{OpenRouterConfig, OpenRouterGateway};
pub use recording::BreakerRecordingGateway;
