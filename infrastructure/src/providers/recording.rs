//! Gateway wrapper feeding call outcomes into the breaker board
//!
//! Sits between the use cases and the real gateway: connection failures and
//! stream errors count against the model's provider, completed streams count
//! in its favor. The wrapper is transparent to the caller.

use crate::breakers::ProviderBreakerBoard;
use async_trait::async_trait;
use council_application::ports::llm_gateway::{
    GatewayError, LlmGateway, LlmSession, ModelStreamEvent, StreamHandle,
};
use council_domain::{ModelId, ProviderKey};
use std::sync::Arc;
use tokio::sync::mpsc;

/// [`LlmGateway`] decorator recording per-provider call outcomes
pub struct BreakerRecordingGateway {
    inner: Arc<dyn LlmGateway>,
    board: Arc<ProviderBreakerBoard>,
}

impl BreakerRecordingGateway {
    pub fn new(inner: Arc<dyn LlmGateway>, board: Arc<ProviderBreakerBoard>) -> Self {
        Self { inner, board }
    }
}

#[async_trait]
impl LlmGateway for BreakerRecordingGateway {
    async fn create_session(
        &self,
        model: &ModelId,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        match self.inner.create_session(model, system_prompt).await {
            Ok(session) => Ok(Box::new(RecordingSession {
                inner: session,
                board: Arc::clone(&self.board),
                provider: model.provider(),
            })),
            Err(e) => {
                self.board.record_failure(&model.provider());
                Err(e)
            }
        }
    }
}

struct RecordingSession {
    inner: Box<dyn LlmSession>,
    board: Arc<ProviderBreakerBoard>,
    provider: ProviderKey,
}

#[async_trait]
impl LlmSession for RecordingSession {
    fn model(&self) -> &ModelId {
        self.inner.model()
    }

    async fn send_streaming(&self, content: &str) -> Result<StreamHandle, GatewayError> {
        let mut upstream = match self.inner.send_streaming(content).await {
            Ok(handle) => handle,
            Err(e) => {
                self.board.record_failure(&self.provider);
                return Err(e);
            }
        };

        // Relay the stream so the terminal event can be scored before it
        // reaches the consumer.
        let (tx, rx) = mpsc::channel(64);
        let board = Arc::clone(&self.board);
        let provider = self.provider.clone();
        tokio::spawn(async move {
            let mut settled = false;
            while let Some(event) = upstream.receiver.recv().await {
                match &event {
                    ModelStreamEvent::Completed { .. } => {
                        board.record_success(&provider);
                        settled = true;
                    }
                    ModelStreamEvent::Error(_) => {
                        board.record_failure(&provider);
                        settled = true;
                    }
                    ModelStreamEvent::Delta(_) => {}
                }
                if tx.send(event).await.is_err() {
                    return;
                }
                if settled {
                    return;
                }
            }
            // Truncation without a terminal event counts as a failure.
            if !settled {
                board.record_failure(&provider);
            }
        });

        Ok(StreamHandle::new(rx))
    }
}
