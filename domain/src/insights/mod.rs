//! Selection insights: diversity and dominance statistics
//!
//! Computed from a user's historical `selected_persona` distribution, never
//! from a single session. The diversity score is the normalized Shannon
//! entropy of the selection distribution scaled to 0-100: 0 means the same
//! persona is always chosen, 100 means selections are perfectly uniform
//! across all enabled personas.

use crate::persona::Persona;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Share of total selections (percent) above which one persona dominates.
const DOMINANCE_THRESHOLD: f64 = 60.0;

/// Insights over a user's historical persona selections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaInsights {
    /// The persona holding >60% of selections, if any.
    pub dominant_persona: Option<Persona>,
    /// Normalized Shannon entropy of the selection distribution, 0-100.
    pub diversity_score: u8,
    /// Advice derived from the fixed decision table below.
    pub recommendation: String,
    /// Each persona's share of total selections, in percent.
    pub per_persona_score: HashMap<Persona, f64>,
}

/// Result of an insights computation
///
/// With zero selections there is no distribution to score, so the engine
/// reports `NoData` instead of a misleading number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsightsReport {
    NoData { message: String },
    Computed(PersonaInsights),
}

impl InsightsReport {
    pub fn no_data() -> Self {
        InsightsReport::NoData {
            message: "No selections yet. Pick the council answer that served you \
                      best and insights will build up over time."
                .to_string(),
        }
    }
}

/// Compute insights from per-persona selection counts.
pub fn compute_insights(selection_counts: &HashMap<Persona, u64>) -> InsightsReport {
    let total: u64 = selection_counts.values().sum();
    if total == 0 {
        return InsightsReport::no_data();
    }

    let per_persona_score: HashMap<Persona, f64> = Persona::default_order()
        .into_iter()
        .map(|p| {
            let count = selection_counts.get(&p).copied().unwrap_or(0);
            (p, count as f64 / total as f64 * 100.0)
        })
        .collect();

    let dominant_persona = per_persona_score
        .iter()
        .filter(|(_, share)| **share > DOMINANCE_THRESHOLD)
        .map(|(p, _)| *p)
        .next();

    let diversity_score = diversity_score(selection_counts);

    InsightsReport::Computed(PersonaInsights {
        dominant_persona,
        diversity_score,
        recommendation: recommendation(diversity_score, dominant_persona),
        per_persona_score,
    })
}

/// Normalized Shannon entropy of the selection distribution, scaled 0-100.
///
/// Normalization uses the full enabled-persona count, so a user must spread
/// selections across every persona to reach 100.
pub fn diversity_score(selection_counts: &HashMap<Persona, u64>) -> u8 {
    let total: u64 = selection_counts.values().sum();
    if total == 0 {
        return 0;
    }

    let entropy: f64 = selection_counts
        .values()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total as f64;
            -p * p.ln()
        })
        .sum();

    let max_entropy = (Persona::default_order().len() as f64).ln();
    ((entropy / max_entropy) * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Fixed decision table keyed by diversity bands and dominance.
fn recommendation(score: u8, dominant: Option<Persona>) -> String {
    if let Some(persona) = dominant {
        return format!(
            "{} answers most of your questions. Try weighing the other \
             perspectives before choosing - a dominant voice can become a blind spot.",
            persona.definition().display_name
        );
    }
    match score {
        0..=24 => "Your picks cluster around one or two perspectives. Revisit a past \
                   question and read the perspectives you didn't choose."
            .to_string(),
        25..=60 => "You lean on a couple of favorite perspectives with occasional \
                    variety. A healthy mix - keep comparing answers before choosing."
            .to_string(),
        _ => "You draw on the full council. Your selections suggest you match the \
              perspective to the problem rather than playing favorites."
            .to_string(),
    }
}
