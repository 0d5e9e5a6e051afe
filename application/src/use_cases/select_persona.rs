//! Select Persona use case - the selection & feedback bridge
//!
//! Records which persona's answer the user picked (last write wins) and, as
//! a fire-and-forget side effect, forwards the selection to the memory
//! collaborator as two durable notes. The write-back runs on a detached
//! task behind a timeout and its failures never surface to the caller.

use crate::ports::memory_gateway::MemoryGateway;
use crate::ports::session_store::{SessionStore, StoreError};
use council_domain::{Persona, PromptTemplate, SessionId, UnitStatus, UserId};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

/// Budget for the detached memory write-back.
const WRITE_BACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur while recording a selection
#[derive(Error, Debug)]
pub enum SelectError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Session does not belong to the caller")]
    NotOwner,

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for SelectError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => SelectError::SessionNotFound(id),
            other => SelectError::Store(other),
        }
    }
}

/// Use case for recording the user's persona selection
pub struct SelectPersonaUseCase {
    store: Arc<dyn SessionStore>,
    memory: Arc<dyn MemoryGateway>,
}

impl SelectPersonaUseCase {
    pub fn new(store: Arc<dyn SessionStore>, memory: Arc<dyn MemoryGateway>) -> Self {
        Self { store, memory }
    }

    /// Record that `user` picked `persona` as the best answer for the
    /// session. Overwrites any prior selection; no history is kept here.
    pub async fn execute(
        &self,
        session_id: &SessionId,
        user: &UserId,
        persona: Persona,
    ) -> Result<(), SelectError> {
        let session = self.store.session(session_id).await?;
        if !session.is_owned_by(user) {
            return Err(SelectError::NotOwner);
        }

        self.store.set_selected_persona(session_id, persona).await?;
        info!(session = %session_id, persona = %persona, "Persona selected");

        // Best-effort enrichment: detached, time-boxed, failures swallowed.
        let selected_content = self
            .store
            .units_for(session_id)
            .await
            .ok()
            .and_then(|units| {
                units
                    .into_iter()
                    .find(|u| u.persona == persona && u.status == UnitStatus::Completed)
                    .map(|u| u.content)
            });

        let memory = Arc::clone(&self.memory);
        let user = user.clone();
        let query = session.query.content().to_string();
        let session_id = session_id.clone();
        tokio::spawn(async move {
            let write_back = async {
                let preference = PromptTemplate::preference_note(persona, &query);
                let metadata = json!({
                    "kind": "council_preference",
                    "session_id": session_id.as_str(),
                    "persona": persona.as_str(),
                });
                if let Err(e) = memory.add(&preference, &user, metadata).await {
                    warn!(session = %session_id, error = %e, "Preference note write-back failed");
                }

                if let Some(content) = selected_content {
                    let insight = PromptTemplate::content_insight_note(persona, &content);
                    let metadata = json!({
                        "kind": "council_insight",
                        "session_id": session_id.as_str(),
                        "persona": persona.as_str(),
                    });
                    if let Err(e) = memory.add(&insight, &user, metadata).await {
                        warn!(session = %session_id, error = %e, "Insight note write-back failed");
                    }
                }
            };

            if timeout(WRITE_BACK_TIMEOUT, write_back).await.is_err() {
                warn!(session = %session_id, "Selection write-back timed out");
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::support::{MemStore, StubMemory};
    use council_domain::{DeliberationSession, Query, ResponseUnit, TokenUsage};

    fn seeded(store: &MemStore, owner: &UserId) -> SessionId {
        let session = DeliberationSession::new(
            owner.clone(),
            Query::new("How do I negotiate a raise?").unwrap(),
        );
        let mut unit = ResponseUnit::new(session.id.clone(), Persona::Strategist);
        unit.begin_streaming();
        unit.append_chunk("Anchor high and let them counter.");
        unit.complete(TokenUsage::new(10, 40), 900);
        let id = session.id.clone();
        store.seed_session(session, vec![unit]);
        id
    }

    #[tokio::test]
    async fn only_the_owner_may_select() {
        let store = Arc::new(MemStore::new());
        let id = seeded(&store, &UserId::new("owner"));
        let use_case = SelectPersonaUseCase::new(store, Arc::new(StubMemory::empty()));

        let err = use_case
            .execute(&id, &UserId::new("intruder"), Persona::Strategist)
            .await
            .unwrap_err();
        assert!(matches!(err, SelectError::NotOwner));
    }

    #[tokio::test]
    async fn unknown_session_is_reported_as_not_found() {
        let use_case = SelectPersonaUseCase::new(
            Arc::new(MemStore::new()),
            Arc::new(StubMemory::empty()),
        );

        let err = use_case
            .execute(&SessionId::new("missing"), &UserId::new("owner"), Persona::Analyst)
            .await
            .unwrap_err();
        assert!(matches!(err, SelectError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn reselection_overwrites_the_previous_choice() {
        let owner = UserId::new("owner");
        let store = Arc::new(MemStore::new());
        let id = seeded(&store, &owner);
        let use_case =
            SelectPersonaUseCase::new(Arc::clone(&store) as Arc<dyn SessionStore>, Arc::new(StubMemory::empty()));

        use_case.execute(&id, &owner, Persona::Analyst).await.unwrap();
        use_case.execute(&id, &owner, Persona::Empath).await.unwrap();

        let session = store.sessions.lock().unwrap()[&id].clone();
        assert_eq!(session.selected_persona, Some(Persona::Empath));
    }

    #[tokio::test]
    async fn selection_writes_preference_and_insight_notes_back() {
        let owner = UserId::new("owner");
        let store = Arc::new(MemStore::new());
        let id = seeded(&store, &owner);
        let memory = Arc::new(StubMemory::empty());
        let use_case = SelectPersonaUseCase::new(
            Arc::clone(&store) as Arc<dyn SessionStore>,
            Arc::clone(&memory) as Arc<dyn MemoryGateway>,
        );

        use_case.execute(&id, &owner, Persona::Strategist).await.unwrap();

        // The write-back is detached; give it a beat to land.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let added = memory.added.lock().unwrap();
        assert_eq!(added.len(), 2);
        assert!(added[0].contains("How do I negotiate a raise?"));
        assert!(added[1].contains("Anchor high"));
    }

    #[tokio::test]
    async fn memory_outage_never_fails_the_selection() {
        let owner = UserId::new("owner");
        let store = Arc::new(MemStore::new());
        let id = seeded(&store, &owner);
        let memory = Arc::new(StubMemory {
            fail_add: true,
            ..StubMemory::default()
        });
        let use_case = SelectPersonaUseCase::new(
            Arc::clone(&store) as Arc<dyn SessionStore>,
            memory,
        );

        use_case.execute(&id, &owner, Persona::Strategist).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let session = store.sessions.lock().unwrap()[&id].clone();
        assert_eq!(session.selected_persona, Some(Persona::Strategist));
    }
}
