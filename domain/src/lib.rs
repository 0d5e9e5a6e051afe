//! Domain layer for aspendos-council
//!
//! This crate contains the core business logic, entities, and value objects
//! for multi-persona deliberation. It has no dependencies on infrastructure
//! or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! One user query is dispatched to every enabled persona in parallel; each
//! persona streams its answer independently, and a moderator model can
//! synthesize the completed answers into a single recommendation.
//!
//! ## Derived session status
//!
//! A session's status is a pure function of its response units' statuses
//! ([`derive_session_status`]) and is recomputed on every read rather than
//! stored, so the concurrent fan-out never races on a shared status field.

pub mod breaker;
pub mod catalog;
pub mod core;
pub mod deliberation;
pub mod insights;
pub mod persona;
pub mod prompt;
pub mod routing;

// Re-export commonly used types
pub use breaker::CircuitState;
pub use catalog::{ModelInfo, display_label, model_info};
pub use core::{
    error::DomainError,
    ids::{SessionId, UserId},
    model_id::{ModelId, ProviderKey},
    query::Query,
};
pub use deliberation::{
    CouncilEvent, DeliberationSession, FAILED_CONTENT_PLACEHOLDER, ResponseUnit, SessionStatus,
    TokenUsage, UnitStatus, derive_session_status,
};
pub use insights::{InsightsReport, PersonaInsights, compute_insights, diversity_score};
pub use persona::{Persona, PersonaDefinition};
pub use prompt::PromptTemplate;
pub use routing::{FallbackChains, downgrade_model, is_short_acknowledgement};
