//! Synthesize use case
//!
//! Produces one consensus text from a session's completed response units.
//! This is a separate, subsequent step after the parallel fan-out, invoked
//! once the caller decides enough units are complete.

use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::session_store::{SessionStore, StoreError};
use council_domain::{
    ModelId, Persona, PromptTemplate, SessionId, TokenUsage, UnitStatus,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during synthesis
#[derive(Error, Debug)]
pub enum SynthesizeError {
    /// Synthesis needs at least one completed unit; partial synthesis from
    /// whatever completed is fine, zero is not.
    #[error("No completed responses to synthesize")]
    NoCompletedResponses,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Result of a synthesis call
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub text: String,
    pub usage: TokenUsage,
    pub moderator: ModelId,
}

/// Use case for synthesizing completed persona answers
pub struct SynthesizeUseCase {
    gateway: Arc<dyn LlmGateway>,
    store: Arc<dyn SessionStore>,
    moderator: ModelId,
}

impl SynthesizeUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            gateway,
            store,
            moderator: ModelId::parse("openai/gpt-5.2").expect("static model id"),
        }
    }

    /// Use a specific moderator model instead of the default.
    pub fn with_moderator(mut self, moderator: ModelId) -> Self {
        self.moderator = moderator;
        self
    }

    /// Synthesize all completed units of a session into one recommendation,
    /// store it on the session, and return it with its usage accounting.
    pub async fn execute(&self, session_id: &SessionId) -> Result<SynthesisOutcome, SynthesizeError> {
        let session = self.store.session(session_id).await?;
        let units = self.store.units_for(session_id).await?;

        let completed: Vec<(Persona, String)> = units
            .into_iter()
            .filter(|u| u.status == UnitStatus::Completed)
            .map(|u| (u.persona, u.content))
            .collect();

        if completed.is_empty() {
            return Err(SynthesizeError::NoCompletedResponses);
        }

        info!(session = %session_id, perspectives = completed.len(), "Synthesizing council answers");

        let prompt = PromptTemplate::synthesis_prompt(session.query.content(), &completed);
        let model_session = self
            .gateway
            .create_session(&self.moderator, PromptTemplate::synthesis_system())
            .await?;
        let call = model_session.send(&prompt).await?;

        self.store.set_synthesis(session_id, &call.text).await?;

        Ok(SynthesisOutcome {
            text: call.text,
            usage: call.usage,
            moderator: self.moderator.clone(),
        })
    }
}
