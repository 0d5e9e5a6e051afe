//! In-memory session store
//!
//! Process-local backend for the session store port. Sessions and units
//! live for the lifetime of the process; selection counts are derived from
//! the stored sessions rather than kept as a separate counter.

use async_trait::async_trait;
use council_application::ports::session_store::{SessionStore, StoreError};
use council_domain::{DeliberationSession, Persona, ResponseUnit, SessionId, UserId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Thread-safe in-memory implementation of [`SessionStore`]
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, DeliberationSession>>,
    units: RwLock<HashMap<SessionId, Vec<ResponseUnit>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, session: &DeliberationSession) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn insert_units(&self, units: &[ResponseUnit]) -> Result<(), StoreError> {
        let Some(first) = units.first() else {
            return Ok(());
        };
        self.units
            .write()
            .await
            .insert(first.session_id.clone(), units.to_vec());
        Ok(())
    }

    async fn update_unit(&self, unit: &ResponseUnit) -> Result<(), StoreError> {
        let mut all = self.units.write().await;
        let units = all
            .get_mut(&unit.session_id)
            .ok_or_else(|| StoreError::NotFound(unit.session_id.clone()))?;
        match units.iter_mut().find(|u| u.persona == unit.persona) {
            Some(slot) => *slot = unit.clone(),
            None => units.push(unit.clone()),
        }
        Ok(())
    }

    async fn session(&self, id: &SessionId) -> Result<DeliberationSession, StoreError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn units_for(&self, id: &SessionId) -> Result<Vec<ResponseUnit>, StoreError> {
        if !self.sessions.read().await.contains_key(id) {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(self.units.read().await.get(id).cloned().unwrap_or_default())
    }

    async fn set_selected_persona(
        &self,
        id: &SessionId,
        persona: Persona,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        session.selected_persona = Some(persona);
        Ok(())
    }

    async fn set_synthesis(&self, id: &SessionId, text: &str) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        session.synthesis_text = Some(text.to_string());
        Ok(())
    }

    async fn selection_counts(
        &self,
        user: &UserId,
    ) -> Result<HashMap<Persona, u64>, StoreError> {
        let sessions = self.sessions.read().await;
        let mut counts: HashMap<Persona, u64> = HashMap::new();
        for session in sessions.values() {
            if session.is_owned_by(user)
                && let Some(persona) = session.selected_persona
            {
                *counts.entry(persona).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}
