//! Deliberation session and response unit entities
//!
//! A [`DeliberationSession`] is one user query dispatched to all enabled
//! personas; each persona's work item and result container is a
//! [`ResponseUnit`]. Session status is never stored independently: it is
//! derived from the unit statuses via [`derive_session_status`] on every
//! read, which avoids concurrent-update races under the fan-out model.

use crate::core::ids::{SessionId, UserId};
use crate::core::model_id::ModelId;
use crate::core::query::Query;
use crate::deliberation::usage::TokenUsage;
use crate::persona::Persona;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder content stored on a unit that never produced output.
pub const FAILED_CONTENT_PLACEHOLDER: &str = "[no response]";

/// Lifecycle state of a single response unit
///
/// Transitions are monotonic: a unit never returns to `Pending` after
/// leaving it, and content never changes after a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Pending,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl UnitStatus {
    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UnitStatus::Completed | UnitStatus::Failed | UnitStatus::Cancelled
        )
    }
}

/// Derived lifecycle state of a whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Streaming,
    Completed,
    Failed,
}

/// Derive a session's status from its units' statuses.
///
/// The rule, applied to the current snapshot every time it is queried:
/// - all units `Completed` -> `Completed`
/// - every unit terminal and at least one `Failed`/`Cancelled` -> `Failed`
/// - otherwise `Streaming` once any unit has left `Pending`, else `Pending`
///
/// Note the deliberate strictness: a session where 3 of 4 units completed
/// and one failed is `Failed`, not `Completed`.
pub fn derive_session_status<I>(unit_statuses: I) -> SessionStatus
where
    I: IntoIterator<Item = UnitStatus>,
{
    let mut any_left_pending = false;
    let mut any_non_terminal = false;
    let mut any_failed = false;
    let mut any_unit = false;

    for status in unit_statuses {
        any_unit = true;
        match status {
            UnitStatus::Pending => any_non_terminal = true,
            UnitStatus::Streaming => {
                any_non_terminal = true;
                any_left_pending = true;
            }
            UnitStatus::Completed => any_left_pending = true,
            UnitStatus::Failed | UnitStatus::Cancelled => {
                any_left_pending = true;
                any_failed = true;
            }
        }
    }

    if !any_unit {
        return SessionStatus::Pending;
    }

    if any_non_terminal {
        if any_left_pending {
            SessionStatus::Streaming
        } else {
            SessionStatus::Pending
        }
    } else if any_failed {
        SessionStatus::Failed
    } else {
        SessionStatus::Completed
    }
}

/// One persona's work item and result container within a session
///
/// A unit's content is append-only with a single writer (its own streaming
/// task); everyone else observes it through events or store reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseUnit {
    pub session_id: SessionId,
    pub persona: Persona,
    /// Concrete model decided at task start; differs from the persona's
    /// nominal model when a fallback was used.
    pub resolved_model: Option<ModelId>,
    pub content: String,
    pub status: UnitStatus,
    pub latency_ms: Option<u64>,
    pub usage: Option<TokenUsage>,
    /// Failure reason for `Failed`/`Cancelled` units.
    pub error: Option<String>,
}

impl ResponseUnit {
    pub fn new(session_id: SessionId, persona: Persona) -> Self {
        Self {
            session_id,
            persona,
            resolved_model: None,
            content: String::new(),
            status: UnitStatus::Pending,
            latency_ms: None,
            usage: None,
            error: None,
        }
    }

    /// Transition `Pending` -> `Streaming`. Resolution happens after this,
    /// so the resolved model is recorded separately.
    pub fn begin_streaming(&mut self) {
        debug_assert_eq!(self.status, UnitStatus::Pending);
        self.status = UnitStatus::Streaming;
    }

    /// Record the concrete model decided for this unit.
    pub fn set_resolved_model(&mut self, resolved_model: ModelId) {
        self.resolved_model = Some(resolved_model);
    }

    /// Append one streamed chunk. No-op after a terminal state.
    pub fn append_chunk(&mut self, chunk: &str) {
        if !self.status.is_terminal() {
            self.content.push_str(chunk);
        }
    }

    /// Transition to `Completed` with usage and latency accounting.
    pub fn complete(&mut self, usage: TokenUsage, latency_ms: u64) {
        if self.status.is_terminal() {
            return;
        }
        self.usage = Some(usage);
        self.latency_ms = Some(latency_ms);
        self.status = UnitStatus::Completed;
    }

    /// Transition to `Failed`, keeping any partial content.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        if self.content.is_empty() {
            self.content = FAILED_CONTENT_PLACEHOLDER.to_string();
        }
        self.error = Some(reason.into());
        self.status = UnitStatus::Failed;
    }

    /// Transition to `Cancelled` after a caller-initiated cancellation.
    pub fn cancel(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        if self.content.is_empty() {
            self.content = FAILED_CONTENT_PLACEHOLDER.to_string();
        }
        self.error = Some("cancelled".to_string());
        self.status = UnitStatus::Cancelled;
    }
}

/// One user query dispatched to all enabled personas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliberationSession {
    pub id: SessionId,
    pub owner_id: UserId,
    pub query: Query,
    /// Last persona the user picked as the best answer; last write wins,
    /// no history retained.
    pub selected_persona: Option<Persona>,
    pub synthesis_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DeliberationSession {
    pub fn new(owner_id: UserId, query: Query) -> Self {
        Self {
            id: SessionId::generate(),
            owner_id,
            query,
            selected_persona: None,
            synthesis_text: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_session_is_pending() {
        assert_eq!(derive_session_status([]), SessionStatus::Pending);
    }

    #[test]
    fn all_pending_is_pending() {
        let statuses = [UnitStatus::Pending, UnitStatus::Pending];
        assert_eq!(derive_session_status(statuses), SessionStatus::Pending);
    }

    #[test]
    fn any_streaming_makes_session_streaming() {
        let statuses = [UnitStatus::Pending, UnitStatus::Streaming];
        assert_eq!(derive_session_status(statuses), SessionStatus::Streaming);
    }

    #[test]
    fn completed_unit_with_pending_sibling_is_streaming() {
        let statuses = [UnitStatus::Completed, UnitStatus::Pending];
        assert_eq!(derive_session_status(statuses), SessionStatus::Streaming);
    }

    #[test]
    fn all_completed_is_completed() {
        let statuses = [UnitStatus::Completed; 4];
        assert_eq!(derive_session_status(statuses), SessionStatus::Completed);
    }

    #[test]
    fn failure_only_propagates_once_all_units_are_terminal() {
        // One unit failed but a sibling is still streaming: not failed yet.
        let in_flight = [UnitStatus::Failed, UnitStatus::Streaming];
        assert_eq!(derive_session_status(in_flight), SessionStatus::Streaming);

        // Same failure once every unit is terminal: now the session fails,
        // even though three of four units succeeded.
        let settled = [
            UnitStatus::Completed,
            UnitStatus::Completed,
            UnitStatus::Completed,
            UnitStatus::Failed,
        ];
        assert_eq!(derive_session_status(settled), SessionStatus::Failed);
    }

    #[test]
    fn cancelled_counts_as_failure_for_derivation() {
        let statuses = [UnitStatus::Completed, UnitStatus::Cancelled];
        assert_eq!(derive_session_status(statuses), SessionStatus::Failed);
    }

    #[test]
    fn unit_content_is_append_only_until_terminal() {
        let session = SessionId::new("s-1");
        let mut unit = ResponseUnit::new(session, Persona::Analyst);
        unit.begin_streaming();
        unit.set_resolved_model(ModelId::parse("openai/gpt-5.2").unwrap());

        unit.append_chunk("Hello");
        unit.append_chunk(", world");
        assert_eq!(unit.content, "Hello, world");

        unit.complete(TokenUsage::new(10, 20), 1_500);
        assert_eq!(unit.status, UnitStatus::Completed);

        // Appends after a terminal state are ignored.
        unit.append_chunk(" - too late");
        assert_eq!(unit.content, "Hello, world");
    }

    #[test]
    fn failed_unit_without_output_gets_placeholder() {
        let mut unit = ResponseUnit::new(SessionId::new("s-1"), Persona::Creative);
        unit.begin_streaming();
        unit.fail("upstream stream failure");

        assert_eq!(unit.status, UnitStatus::Failed);
        assert_eq!(unit.content, FAILED_CONTENT_PLACEHOLDER);
        assert_eq!(unit.error.as_deref(), Some("upstream stream failure"));
    }

    #[test]
    fn failed_unit_keeps_partial_content() {
        let mut unit = ResponseUnit::new(SessionId::new("s-1"), Persona::Empath);
        unit.begin_streaming();
        unit.append_chunk("partial answer");
        unit.fail("connection reset");

        assert_eq!(unit.content, "partial answer");
    }

    #[test]
    fn terminal_transitions_do_not_overwrite_each_other() {
        let mut unit = ResponseUnit::new(SessionId::new("s-1"), Persona::Strategist);
        unit.begin_streaming();
        unit.complete(TokenUsage::default(), 100);
        unit.fail("late error");

        assert_eq!(unit.status, UnitStatus::Completed);
        assert!(unit.error.is_none());
    }

    #[test]
    fn session_ownership_check() {
        let session = DeliberationSession::new(
            UserId::new("alice"),
            Query::new("what should we do?").unwrap(),
        );
        assert!(session.is_owned_by(&UserId::new("alice")));
        assert!(!session.is_owned_by(&UserId::new("bob")));
    }
}
