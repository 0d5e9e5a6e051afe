//! Query value object representing one user question to the council

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A user query submitted for deliberation (Value Object)
///
/// Guaranteed non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query(String);

impl Query {
    pub fn new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::InvalidQuery("query is empty".to_string()));
        }
        Ok(Query(content))
    }

    pub fn content(&self) -> &str {
        &self.0
    }

    /// Byte length of the raw query text.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
