//! Deliberation session domain: entities, statuses, events, and usage accounting

pub mod entities;
pub mod events;
pub mod usage;

pub use entities::{
    DeliberationSession, FAILED_CONTENT_PLACEHOLDER, ResponseUnit, SessionStatus, UnitStatus,
    derive_session_status,
};
pub use events::CouncilEvent;
pub use usage::TokenUsage;
