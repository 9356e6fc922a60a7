//! services/api/src/adapters/corrector.rs
//!
//! Fixes a single failing GeoGebra command by asking the LLM for a replacement.
//! It implements the `CommandCorrector` port from the `core` crate.

use std::sync::Arc;

use async_trait::async_trait;
use geogebra_assistant_core::{
    domain::Message,
    ports::{ChatCompletionService, CommandCorrector, PortError, PortResult},
};

/// Sampling temperature for single-command fixes; independent of regeneration.
pub const CORRECTION_TEMPERATURE: f32 = 0.2;

const CORRECTION_INSTRUCTIONS: &str = r#"You are a GeoGebra syntax checker. You receive one GeoGebra command that failed to execute together with the error GeoGebra reported.
Reply with the corrected command only: a single line, no explanation, no numbering, no code fences.
Keep the original object names and intent. Use English command names and parentheses, e.g. Circle(A, 3)."#;

/// An adapter that implements `CommandCorrector` on top of any chat-completion service.
pub struct LlmCommandCorrector {
    llm: Arc<dyn ChatCompletionService>,
    model: String,
}

impl LlmCommandCorrector {
    pub fn new(llm: Arc<dyn ChatCompletionService>, model: String) -> Self {
        Self { llm, model }
    }
}

/// Strips Markdown fences and inline backticks the model sometimes wraps around the command.
fn clean_reply(reply: &str) -> String {
    reply
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("```"))
        .unwrap_or_default()
        .trim_matches('`')
        .trim()
        .to_string()
}

#[async_trait]
impl CommandCorrector for LlmCommandCorrector {
    async fn correct_command(&self, command: &str, error: &str) -> PortResult<String> {
        let messages = [
            Message::system(CORRECTION_INSTRUCTIONS),
            Message::user(format!("Command: {}\nError: {}", command, error)),
        ];

        let reply = self
            .llm
            .complete(&self.model, &messages, CORRECTION_TEMPERATURE)
            .await?;

        let corrected = clean_reply(&reply);
        if corrected.is_empty() {
            return Err(PortError::InvalidResponse(
                "Command correction LLM returned an empty command.".to_string(),
            ));
        }
        Ok(corrected)
    }
}
