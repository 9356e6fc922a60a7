//! crates/geogebra_assistant_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! Every collaborator the assistant talks to (command retrieval, command
//! extraction, single-command correction, the hosted LLM) sits behind one of
//! these traits so the core never depends on a concrete implementation.

use async_trait::async_trait;

use crate::domain::{CommandMatch, CommandRecord, Message};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g. network, files).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Invalid response from upstream service: {0}")]
    InvalidResponse(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CommandRetriever: Send + Sync {
    /// Returns up to `top_k` command descriptions relevant to `query`, most relevant first.
    async fn related_command_details(&self, query: &str, top_k: usize)
        -> PortResult<Vec<String>>;

    /// Returns up to `top_k` matching command names with their relevance, best first.
    async fn search_commands(&self, query: &str, top_k: usize) -> PortResult<Vec<CommandMatch>>;
}

pub trait CommandExtractor: Send + Sync {
    /// Parses free-form LLM output into structured command records.
    fn extract_commands(&self, raw_text: &str) -> PortResult<Vec<CommandRecord>>;
}

#[async_trait]
pub trait CommandCorrector: Send + Sync {
    /// Produces a corrected version of a single failing command.
    async fn correct_command(&self, command: &str, error: &str) -> PortResult<String>;
}

#[async_trait]
pub trait ChatCompletionService: Send + Sync {
    /// Sends an ordered conversation to a hosted chat model and returns its raw text reply.
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        temperature: f32,
    ) -> PortResult<String>;
}
