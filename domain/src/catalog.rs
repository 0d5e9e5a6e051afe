//! Static catalog of the models the council routes to
//!
//! Display names, context windows, and list prices for the models that
//! appear in persona definitions, fallback chains, and downgrade tiers.
//! Models absent from the catalog still work; they just render with
//! their raw identifier and no cost estimate.

use crate::core::model_id::ModelId;
use crate::deliberation::usage::TokenUsage;

/// Metadata for one catalogued model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub context_window: u32,
    /// USD per 1k input tokens.
    pub cost_per_1k_input: f64,
    /// USD per 1k output tokens.
    pub cost_per_1k_output: f64,
}

impl ModelInfo {
    /// Estimated USD cost of a call given its reported token usage.
    pub fn estimated_cost(&self, usage: &TokenUsage) -> f64 {
        let input = usage.input_tokens as f64 / 1000.0 * self.cost_per_1k_input;
        let output = usage.output_tokens as f64 / 1000.0 * self.cost_per_1k_output;
        input + output
    }
}

static CATALOG: &[ModelInfo] = &[
    ModelInfo {
        id: "openai/gpt-5.2",
        display_name: "GPT-5.2",
        context_window: 256_000,
        cost_per_1k_input: 0.10,
        cost_per_1k_output: 0.40,
    },
    ModelInfo {
        id: "openai/gpt-5-nano",
        display_name: "GPT-5 Nano",
        context_window: 64_000,
        cost_per_1k_input: 0.0003,
        cost_per_1k_output: 0.0012,
    },
    ModelInfo {
        id: "anthropic/claude-opus-4.5",
        display_name: "Claude Opus 4.5",
        context_window: 200_000,
        cost_per_1k_input: 0.15,
        cost_per_1k_output: 0.75,
    },
    ModelInfo {
        id: "anthropic/claude-sonnet-4.5",
        display_name: "Claude Sonnet 4.5",
        context_window: 200_000,
        cost_per_1k_input: 0.003,
        cost_per_1k_output: 0.015,
    },
    ModelInfo {
        id: "anthropic/claude-haiku-4.5",
        display_name: "Claude Haiku 4.5",
        context_window: 200_000,
        cost_per_1k_input: 0.0008,
        cost_per_1k_output: 0.004,
    },
    ModelInfo {
        id: "google/gemini-3-pro-preview",
        display_name: "Gemini 3 Pro",
        context_window: 2_000_000,
        cost_per_1k_input: 0.00125,
        cost_per_1k_output: 0.005,
    },
    ModelInfo {
        id: "google/gemini-3-flash-preview",
        display_name: "Gemini 3 Flash",
        context_window: 1_000_000,
        cost_per_1k_input: 0.000_075,
        cost_per_1k_output: 0.0003,
    },
    ModelInfo {
        id: "mistralai/mistral-large-2512",
        display_name: "Mistral Large",
        context_window: 128_000,
        cost_per_1k_input: 0.002,
        cost_per_1k_output: 0.006,
    },
    ModelInfo {
        id: "deepseek/deepseek-v3.2",
        display_name: "DeepSeek V3.2",
        context_window: 128_000,
        cost_per_1k_input: 0.000_27,
        cost_per_1k_output: 0.0011,
    },
    ModelInfo {
        id: "x-ai/grok-4",
        display_name: "Grok 4",
        context_window: 131_072,
        cost_per_1k_input: 0.01,
        cost_per_1k_output: 0.03,
    },
];

/// Catalog entry for a model, if it is one we know about.
pub fn model_info(id: &ModelId) -> Option<&'static ModelInfo> {
    CATALOG.iter().find(|info| info.id == id.as_str())
}

/// Human-readable label for a model: the catalogued display name, or
/// the raw identifier when the model is not catalogued.
pub fn display_label(id: &ModelId) -> &str {
    model_info(id).map_or_else(|| id.as_str(), |info| info.display_name)
}
