//! Application layer for the Aspendos council
//!
//! Use cases orchestrating the deliberation lifecycle, and the ports they
//! depend on. This layer owns the concurrency model (parallel fan-out, the
//! orchestrator event loop, cancellation) and the model resolution policy;
//! everything provider- or storage-specific sits behind a port.

pub mod ports;
pub mod preference;
pub mod resolver;
pub mod use_cases;

pub use ports::breaker_state::{BreakerStateSource, NoBreakers};
pub use ports::llm_gateway::{
    CompletedCall, GatewayError, LlmGateway, LlmSession, ModelStreamEvent, StreamHandle,
};
pub use ports::memory_gateway::{MemoryError, MemoryGateway, MemoryNote};
pub use ports::session_store::{SessionStore, StoreError};
pub use preference::PreferenceLearner;
pub use resolver::{ModelResolver, ResolveError, ResolvedModel};
pub use use_cases::insights::InsightsUseCase;
pub use use_cases::run_council::{CouncilHandle, RunCouncilError, RunCouncilUseCase};
pub use use_cases::select_persona::{SelectError, SelectPersonaUseCase};
pub use use_cases::synthesize::{SynthesisOutcome, SynthesizeError, SynthesizeUseCase};
