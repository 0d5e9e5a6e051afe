//! Persistence collaborator port
//!
//! Durable storage for deliberation sessions and response units. The
//! orchestrator expresses its lifecycle as read/write calls against this
//! port; backends live in the infrastructure layer.

use async_trait::async_trait;
use council_domain::{DeliberationSession, Persona, ResponseUnit, SessionId, UserId};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from the persistence collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Store for deliberation sessions and their response units
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a newly created session.
    async fn create_session(&self, session: &DeliberationSession) -> Result<(), StoreError>;

    /// Persist the initial response units for a session.
    async fn insert_units(&self, units: &[ResponseUnit]) -> Result<(), StoreError>;

    /// Update one unit's mutable fields (content, status, model, accounting).
    async fn update_unit(&self, unit: &ResponseUnit) -> Result<(), StoreError>;

    /// Load a session by id.
    async fn session(&self, id: &SessionId) -> Result<DeliberationSession, StoreError>;

    /// Load all units belonging to a session.
    async fn units_for(&self, id: &SessionId) -> Result<Vec<ResponseUnit>, StoreError>;

    /// Overwrite the session's selected persona (last write wins).
    async fn set_selected_persona(
        &self,
        id: &SessionId,
        persona: Persona,
    ) -> Result<(), StoreError>;

    /// Store the synthesis text on the session.
    async fn set_synthesis(&self, id: &SessionId, text: &str) -> Result<(), StoreError>;

    /// Grouped count of historical `selected_persona` values for a user.
    async fn selection_counts(&self, user: &UserId) -> Result<HashMap<Persona, u64>, StoreError>;
}
