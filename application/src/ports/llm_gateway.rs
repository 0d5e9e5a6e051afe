//! LLM Gateway port
//!
//! Defines the interface for communicating with model providers.

use async_trait::async_trait;
use council_domain::{ModelId, TokenUsage};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Upstream stream failure: {0}")]
    StreamFailure(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// An event in a streaming model response.
///
/// Bridges infrastructure-level streaming (e.g. SSE chunks from the unified
/// gateway) to the application layer. `Completed` carries the provider's
/// final usage summary.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelStreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// Stream end with the final usage accounting.
    Completed { usage: TokenUsage },
    /// An error that occurred during streaming.
    Error(String),
}

impl ModelStreamEvent {
    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ModelStreamEvent::Completed { .. } | ModelStreamEvent::Error(_)
        )
    }
}

/// Result of a one-shot (non-streaming) model call
#[derive(Debug, Clone)]
pub struct CompletedCall {
    pub text: String,
    pub usage: TokenUsage,
}

/// Handle for receiving streaming events from a model session.
///
/// Wraps an `mpsc::Receiver<ModelStreamEvent>` and provides convenience
/// methods for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<ModelStreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<ModelStreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and collect all text into a single result.
    pub async fn collect_text(mut self) -> Result<CompletedCall, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                ModelStreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                ModelStreamEvent::Completed { usage } => {
                    return Ok(CompletedCall {
                        text: full_text,
                        usage,
                    });
                }
                ModelStreamEvent::Error(e) => {
                    return Err(GatewayError::StreamFailure(e));
                }
            }
        }
        // Channel closed without Completed - treat as a transport failure
        Err(GatewayError::StreamFailure(
            "stream ended without completion".to_string(),
        ))
    }
}

/// Gateway for model communication
///
/// This port defines how the application layer talks to model providers.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Create a new session with the specified model and system prompt
    async fn create_session(
        &self,
        model: &ModelId,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError>;
}

/// An active model session
#[async_trait]
pub trait LlmSession: Send + Sync {
    /// Get the model used by this session
    fn model(&self) -> &ModelId;

    /// Send a message and get a complete response with usage accounting
    async fn send(&self, content: &str) -> Result<CompletedCall, GatewayError> {
        self.send_streaming(content).await?.collect_text().await
    }

    /// Send a message and get a streaming response
    async fn send_streaming(&self, content: &str) -> Result<StreamHandle, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collect_text_joins_deltas_until_completed() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(ModelStreamEvent::Delta("Hel".to_string()))
            .await
            .unwrap();
        tx.send(ModelStreamEvent::Delta("lo".to_string()))
            .await
            .unwrap();
        tx.send(ModelStreamEvent::Completed {
            usage: TokenUsage::new(5, 2),
        })
        .await
        .unwrap();
        drop(tx);

        let call = StreamHandle::new(rx).collect_text().await.unwrap();
        assert_eq!(call.text, "Hello");
        assert_eq!(call.usage, TokenUsage::new(5, 2));
    }

    #[tokio::test]
    async fn collect_text_surfaces_stream_errors() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(ModelStreamEvent::Error("connection reset".to_string()))
            .await
            .unwrap();
        drop(tx);

        let err = StreamHandle::new(rx).collect_text().await.unwrap_err();
        assert!(matches!(err, GatewayError::StreamFailure(_)));
    }

    #[tokio::test]
    async fn truncated_stream_is_a_failure() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(ModelStreamEvent::Delta("partial".to_string()))
            .await
            .unwrap();
        drop(tx);

        assert!(StreamHandle::new(rx).collect_text().await.is_err());
    }
}
