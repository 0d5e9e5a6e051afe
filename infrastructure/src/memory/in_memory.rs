//! In-memory long-term memory backend
//!
//! Keyword-overlap relevance over per-user notes. Stands in for the hosted
//! memory subsystem; it honors the same semantics the use cases rely on
//! (ranked search, durable add with metadata).

use async_trait::async_trait;
use council_application::ports::memory_gateway::{MemoryError, MemoryGateway, MemoryNote};
use council_domain::UserId;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredNote {
    text: String,
    #[allow(dead_code)]
    metadata: Value,
}

/// Process-local [`MemoryGateway`] implementation
#[derive(Default)]
pub struct InMemoryMemoryGateway {
    notes: RwLock<HashMap<UserId, Vec<StoredNote>>>,
}

impl InMemoryMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Fraction of query words appearing in the note, 0.0 to 1.0.
fn relevance(query: &str, note: &str) -> f64 {
    let note_words: Vec<String> = note
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    let query_words: Vec<String> = query
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    if query_words.is_empty() {
        return 0.0;
    }
    let hits = query_words
        .iter()
        .filter(|w| note_words.iter().any(|n| n.contains(*w)))
        .count();
    hits as f64 / query_words.len() as f64
}

#[async_trait]
impl MemoryGateway for InMemoryMemoryGateway {
    async fn search(
        &self,
        query: &str,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<MemoryNote>, MemoryError> {
        let notes = self.notes.read().await;
        let mut ranked: Vec<MemoryNote> = notes
            .get(user)
            .map(|user_notes| {
                user_notes
                    .iter()
                    .map(|note| MemoryNote {
                        relevance: relevance(query, &note.text),
                        text: note.text.clone(),
                    })
                    .filter(|note| note.relevance > 0.0)
                    .collect()
            })
            .unwrap_or_default();
        ranked.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn add(&self, text: &str, user: &UserId, metadata: Value) -> Result<(), MemoryError> {
        self.notes
            .write()
            .await
            .entry(user.clone())
            .or_default()
            .push(StoredNote {
                text: text.to_string(),
                metadata,
            });
        Ok(())
    }
}
