//! Events pushed to the caller while a deliberation session runs
//!
//! The push transport is out of scope; only ordering and content are
//! contractual. Chunk events for a given persona are strictly ordered,
//! and the final unit event for a persona is always exactly one of
//! `UnitCompleted` or `UnitFailed`.

use crate::deliberation::entities::{SessionStatus, UnitStatus};
use crate::deliberation::usage::TokenUsage;
use crate::persona::Persona;
use serde::{Deserialize, Serialize};

/// An event in the per-session caller-facing stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouncilEvent {
    /// A unit's lifecycle status changed.
    UnitStatusChanged { persona: Persona, status: UnitStatus },
    /// A text chunk arrived for one persona.
    ChunkAppended { persona: Persona, text: String },
    /// A unit reached `Completed` with its accounting.
    UnitCompleted {
        persona: Persona,
        latency_ms: u64,
        usage: TokenUsage,
    },
    /// A unit reached `Failed` or `Cancelled`.
    UnitFailed { persona: Persona, reason: String },
    /// The derived session status changed.
    SessionStatusChanged { status: SessionStatus },
}

impl CouncilEvent {
    /// The persona this event belongs to, if it is unit-scoped.
    pub fn persona(&self) -> Option<Persona> {
        match self {
            CouncilEvent::UnitStatusChanged { persona, .. }
            | CouncilEvent::ChunkAppended { persona, .. }
            | CouncilEvent::UnitCompleted { persona, .. }
            | CouncilEvent::UnitFailed { persona, .. } => Some(*persona),
            CouncilEvent::SessionStatusChanged { .. } => None,
        }
    }

    /// Returns true if this is the final event a unit can emit.
    pub fn is_unit_terminal(&self) -> bool {
        matches!(
            self,
            CouncilEvent::UnitCompleted { .. } | CouncilEvent::UnitFailed { .. }
        )
    }
}
