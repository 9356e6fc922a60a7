//! crates/geogebra_assistant_core/src/regeneration.rs
//!
//! Regenerates a complete explanation and command list after the client
//! reported that one of the generated commands failed in GeoGebra.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    domain::RegenerationResult,
    ports::{ChatCompletionService, CommandExtractor, CommandRetriever, PortResult},
    prompt::{assemble_regeneration_prompt, BaselinePrompts, RELATED_COMMANDS_TOP_K},
};

/// Low sampling temperature so repeated corrections stay close to each other.
pub const REGENERATION_TEMPERATURE: f32 = 0.3;

/// The result of a regeneration attempt. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegenerationOutcome {
    Regenerated(RegenerationResult),
    Failed { diagnostic: String },
}

impl RegenerationOutcome {
    /// Folds a failure into a degraded result with a diagnostic text and no commands.
    pub fn into_result(self) -> RegenerationResult {
        match self {
            Self::Regenerated(result) => result,
            Self::Failed { diagnostic } => RegenerationResult {
                content: diagnostic,
                commands: Vec::new(),
            },
        }
    }
}

/// Composes retrieval, prompt assembly, the LLM call and command extraction.
pub struct RegenerationService {
    retriever: Arc<dyn CommandRetriever>,
    extractor: Arc<dyn CommandExtractor>,
    llm: Arc<dyn ChatCompletionService>,
    prompts: BaselinePrompts,
    model: String,
}

impl RegenerationService {
    pub fn new(
        retriever: Arc<dyn CommandRetriever>,
        extractor: Arc<dyn CommandExtractor>,
        llm: Arc<dyn ChatCompletionService>,
        prompts: BaselinePrompts,
        model: String,
    ) -> Self {
        Self {
            retriever,
            extractor,
            llm,
            prompts,
            model,
        }
    }

    /// Produces a new explanation and command list for `original_query`, taking the
    /// failed command and its error into account.
    pub async fn regenerate(
        &self,
        original_query: &str,
        failed_command: &str,
        error_msg: &str,
    ) -> RegenerationOutcome {
        match self
            .try_regenerate(original_query, failed_command, error_msg)
            .await
        {
            Ok(result) => {
                info!(
                    commands = result.commands.len(),
                    "Regenerated response for failed command '{}'", failed_command
                );
                RegenerationOutcome::Regenerated(result)
            }
            Err(e) => {
                warn!("Response regeneration failed: {}", e);
                RegenerationOutcome::Failed {
                    diagnostic: format!("command correction failed: {e}"),
                }
            }
        }
    }

    async fn try_regenerate(
        &self,
        original_query: &str,
        failed_command: &str,
        error_msg: &str,
    ) -> PortResult<RegenerationResult> {
        let related = self
            .retriever
            .related_command_details(original_query, RELATED_COMMANDS_TOP_K)
            .await?;

        let messages = assemble_regeneration_prompt(
            &self.prompts,
            &related,
            original_query,
            failed_command,
            error_msg,
        );

        let content = self
            .llm
            .complete(&self.model, &messages, REGENERATION_TEMPERATURE)
            .await?;
        let commands = self.extractor.extract_commands(&content)?;

        Ok(RegenerationResult { content, commands })
    }
}
