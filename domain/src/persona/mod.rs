//! Persona registry - the fixed set of council perspectives
//!
//! A persona is a named perspective bound to one backend model and one
//! system prompt. Personas are data, not behavior: the closed [`Persona`]
//! enum keys a static definition table, and adding a persona means adding
//! a variant plus a [`PersonaDefinition`], nothing else.

use crate::core::model_id::ModelId;
use serde::{Deserialize, Serialize};

/// The enabled council personas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Analyst,
    Creative,
    Strategist,
    Empath,
}

impl Persona {
    /// Fixed default ordering, used for display and as the tie-breaker
    /// when no per-user preference history exists.
    pub fn default_order() -> [Persona; 4] {
        [
            Persona::Analyst,
            Persona::Creative,
            Persona::Strategist,
            Persona::Empath,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Analyst => "analyst",
            Persona::Creative => "creative",
            Persona::Strategist => "strategist",
            Persona::Empath => "empath",
        }
    }

    /// The static definition bound to this persona.
    pub fn definition(&self) -> PersonaDefinition {
        match self {
            Persona::Analyst => PersonaDefinition {
                display_name: "The Analyst",
                role: "Evidence and first-principles reasoning",
                nominal_model: "openai/gpt-5.2",
                accent_color: "blue",
                system_prompt: "You are The Analyst on a deliberation council. \
                    Break the question down from first principles, weigh evidence, \
                    quantify trade-offs where possible, and flag unstated assumptions. \
                    Be rigorous and direct; avoid hedging.",
            },
            Persona::Creative => PersonaDefinition {
                display_name: "The Creative",
                role: "Lateral thinking and unconventional options",
                nominal_model: "anthropic/claude-sonnet-4.5",
                accent_color: "magenta",
                system_prompt: "You are The Creative on a deliberation council. \
                    Generate unconventional angles and options the obvious framing \
                    misses. Challenge the premise of the question when it deserves \
                    challenging. Favor vivid, concrete ideas over abstractions.",
            },
            Persona::Strategist => PersonaDefinition {
                display_name: "The Strategist",
                role: "Long-horizon consequences and second-order effects",
                nominal_model: "google/gemini-3-pro-preview",
                accent_color: "green",
                system_prompt: "You are The Strategist on a deliberation council. \
                    Reason about long-horizon consequences, incentives, and \
                    second-order effects. Identify what has to be true for each \
                    option to win, and what the reversible next step is.",
            },
            Persona::Empath => PersonaDefinition {
                display_name: "The Empath",
                role: "Human impact and emotional context",
                nominal_model: "anthropic/claude-haiku-4.5",
                accent_color: "yellow",
                system_prompt: "You are The Empath on a deliberation council. \
                    Center the people affected: motivations, fears, relationships, \
                    and wellbeing. Name the emotional subtext of the question and \
                    how each option would actually feel to live with.",
            },
        }
    }

    /// The persona's nominal model as a parsed identifier.
    ///
    /// Definitions are compile-time constants with valid `provider/model`
    /// ids, so this cannot fail at runtime.
    pub fn nominal_model(&self) -> ModelId {
        ModelId::parse(self.definition().nominal_model)
            .unwrap_or_else(|_| unreachable!("persona table holds valid model ids"))
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analyst" => Ok(Persona::Analyst),
            "creative" => Ok(Persona::Creative),
            "strategist" => Ok(Persona::Strategist),
            "empath" => Ok(Persona::Empath),
            other => Err(format!("unknown persona: {other}")),
        }
    }
}

/// Static metadata for one persona (read-only, process-wide)
#[derive(Debug, Clone, Copy)]
pub struct PersonaDefinition {
    pub display_name: &'static str,
    pub role: &'static str,
    pub nominal_model: &'static str,
    pub accent_color: &'static str,
    pub system_prompt: &'static str,
}
