//! Preference learner: per-user persona ordering from selection history

use crate::ports::session_store::SessionStore;
use council_domain::{Persona, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Computes a persona display/execution ordering for a user from historical
/// selection counts.
///
/// Personas with at least one selection come first, by descending count;
/// the rest follow in the fixed default order. The ordering is recomputed on
/// each session creation, never cached.
pub struct PreferenceLearner {
    store: Arc<dyn SessionStore>,
}

impl PreferenceLearner {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Persona ordering for a user. Never fails: a store error falls back
    /// to the default order so session creation is never blocked.
    pub async fn ordering_for(&self, user: &UserId) -> Vec<Persona> {
        let counts = match self.store.selection_counts(user).await {
            Ok(counts) => counts,
            Err(e) => {
                warn!(user = %user, error = %e, "Selection history unavailable, using default order");
                return Persona::default_order().to_vec();
            }
        };
        ordering_from_counts(&counts)
    }
}

/// Pure ordering rule, exposed for tests.
fn ordering_from_counts(counts: &HashMap<Persona, u64>) -> Vec<Persona> {
    let default_order = Persona::default_order();
    let default_index = |p: &Persona| default_order.iter().position(|d| d == p).unwrap_or(0);

    let mut selected: Vec<Persona> = default_order
        .iter()
        .copied()
        .filter(|p| counts.get(p).copied().unwrap_or(0) > 0)
        .collect();
    // Descending count, ties broken by the fixed default order.
    selected.sort_by_key(|p| (std::cmp::Reverse(counts[p]), default_index(p)));

    let mut ordering = selected;
    for persona in default_order {
        if !ordering.contains(&persona) {
            ordering.push(persona);
        }
    }
    ordering
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(Persona, u64)]) -> HashMap<Persona, u64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn zero_history_returns_default_order() {
        assert_eq!(
            ordering_from_counts(&HashMap::new()),
            Persona::default_order().to_vec()
        );
    }

    #[test]
    fn selected_personas_lead_by_descending_count() {
        let ordering = ordering_from_counts(&counts(&[
            (Persona::Empath, 5),
            (Persona::Strategist, 2),
        ]));
        assert_eq!(
            ordering,
            vec![
                Persona::Empath,
                Persona::Strategist,
                Persona::Analyst,
                Persona::Creative,
            ]
        );
    }

    #[test]
    fn ties_break_by_default_order() {
        let ordering = ordering_from_counts(&counts(&[
            (Persona::Empath, 3),
            (Persona::Creative, 3),
        ]));
        assert_eq!(ordering[0], Persona::Creative);
        assert_eq!(ordering[1], Persona::Empath);
    }

    #[test]
    fn every_persona_appears_exactly_once() {
        let ordering = ordering_from_counts(&counts(&[(Persona::Analyst, 1)]));
        assert_eq!(ordering.len(), 4);
        for persona in Persona::default_order() {
            assert_eq!(ordering.iter().filter(|p| **p == persona).count(), 1);
        }
    }
}
