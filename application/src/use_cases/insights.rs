//! Insights use case
//!
//! Computes diversity/dominance statistics over a user's historical persona
//! selections for user-facing feedback.

use crate::ports::session_store::{SessionStore, StoreError};
use council_domain::{InsightsReport, UserId, compute_insights};
use std::sync::Arc;
use tracing::debug;

/// Use case for computing selection insights
pub struct InsightsUseCase {
    store: Arc<dyn SessionStore>,
}

impl InsightsUseCase {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Insights for a user's whole selection history.
    pub async fn execute(&self, user: &UserId) -> Result<InsightsReport, StoreError> {
        let counts = self.store.selection_counts(user).await?;
        debug!(user = %user, personas = counts.len(), "Computing selection insights");
        Ok(compute_insights(&counts))
    }
}
