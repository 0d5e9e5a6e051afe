//! Prompt templates for the council flow

use crate::persona::Persona;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the synthesis call
    pub fn synthesis_system() -> &'static str {
        r#"You are the moderator of a council of distinct perspectives.
Your task is to synthesize their answers into one balanced recommendation that:
1. Acknowledges each perspective briefly
2. Notes where they agree and where they are in tension
3. Gives one concrete recommendation
4. Notes the most important caveats

Be balanced and objective. Give weight to well-reasoned arguments regardless of source."#
    }

    /// User prompt for the synthesis call, built from completed responses.
    pub fn synthesis_prompt(query: &str, responses: &[(Persona, String)]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Council perspectives:
"#,
            query
        );

        for (persona, content) in responses {
            let def = persona.definition();
            prompt.push_str(&format!(
                "\n--- {} ({}) ---\n{}\n",
                def.display_name, def.role, content
            ));
        }

        prompt.push_str(
            r#"
Based on the perspectives above, provide a balanced recommendation with clear
markdown headers for: Perspectives, Agreement & Tension, Recommendation, Caveats."#,
        );

        prompt
    }

    /// Augment a persona's system prompt with recalled memory notes.
    ///
    /// Used on the best-effort enrichment path; with no notes the base
    /// prompt is returned unchanged.
    pub fn with_memory_context(system_prompt: &str, notes: &[String]) -> String {
        if notes.is_empty() {
            return system_prompt.to_string();
        }

        let mut prompt = system_prompt.to_string();
        prompt.push_str("\n\nRelevant context about this user from past conversations:\n");
        for note in notes {
            prompt.push_str(&format!("- {}\n", note));
        }
        prompt
    }

    /// Durable note recorded when a user selects a persona's answer.
    pub fn preference_note(persona: Persona, query: &str) -> String {
        format!(
            "User preferred {}'s perspective for: \"{}\"",
            persona.definition().display_name,
            query
        )
    }

    /// Durable note capturing the content the user found most useful.
    pub fn content_insight_note(persona: Persona, content: &str) -> String {
        // Keep the note compact; memory search works on leading text.
        let excerpt: String = content.chars().take(400).collect();
        format!(
            "Advice from {} the user found valuable: {}",
            persona.definition().display_name,
            excerpt
        )
    }
}
