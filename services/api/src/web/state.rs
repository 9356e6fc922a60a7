//! services/api/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use geogebra_assistant_core::{
    ports::{ChatCompletionService, CommandCorrector, CommandExtractor, CommandRetriever},
    RegenerationService,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub regeneration: Arc<RegenerationService>,
    pub corrector: Arc<dyn CommandCorrector>,
    pub llm: Arc<dyn ChatCompletionService>,
    pub extractor: Arc<dyn CommandExtractor>,
    pub retriever: Arc<dyn CommandRetriever>,
    /// Used by `/generate-commands` when the client does not pick a model.
    pub generation_model: String,
}

//=========================================================================================
// SessionState (Specific to One WebSocket Connection)
//=========================================================================================

/// The state for a single, active WebSocket connection.
///
/// Owned by the connection's loop and dropped with it; nothing is shared between sessions.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// The last query the client sent; empty until the first `query` message.
    pub user_query: String,
}

impl SessionState {
    pub fn has_query(&self) -> bool {
        !self.user_query.is_empty()
    }
}
