//! Long-term memory collaborator port
//!
//! Consumed as best-effort enrichment (prompt augmentation) and best-effort
//! write-back (selection feedback). Never required for correctness: every
//! caller of this port tolerates failure.

use async_trait::async_trait;
use council_domain::UserId;
use thiserror::Error;

/// Errors from the memory collaborator
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Memory retrieval failed: {0}")]
    RetrievalFailed(String),

    #[error("Memory write failed: {0}")]
    WriteFailed(String),
}

/// A ranked note returned by memory search
#[derive(Debug, Clone)]
pub struct MemoryNote {
    pub text: String,
    /// Relevance score assigned by the memory backend, higher is better.
    pub relevance: f64,
}

/// Gateway to the long-term memory subsystem
#[async_trait]
pub trait MemoryGateway: Send + Sync {
    /// Search the user's memory for notes relevant to a query.
    async fn search(
        &self,
        query: &str,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<MemoryNote>, MemoryError>;

    /// Add a durable note to the user's memory.
    async fn add(
        &self,
        text: &str,
        user: &UserId,
        metadata: serde_json::Value,
    ) -> Result<(), MemoryError>;
}
