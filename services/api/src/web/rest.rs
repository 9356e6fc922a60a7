//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints the browser client calls
//! outside of the WebSocket session: free-form command generation and command search.

use crate::web::{
    protocol::{lenient_string, CommandPayload},
    state::AppState,
};
use axum::{extract::State, http::StatusCode, response::Json};
use geogebra_assistant_core::domain::Message;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Sampling temperature for `/generate-commands`.
pub const GENERATION_TEMPERATURE: f32 = 0.7;
/// Result count for `/search-commands` when the request does not name one.
pub const DEFAULT_SEARCH_RESULTS: usize = 5;
/// Upper bound on `top_k` for `/search-commands`.
pub const MAX_SEARCH_RESULTS: usize = 20;

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

/// One chat turn as the client sends it: `role` is `system`, `user` or `assistant`.
#[derive(Deserialize, Debug, Clone)]
pub struct ChatMessagePayload {
    pub role: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GenerateCommandsRequest {
    /// Falls back to the configured generation model when absent or blank.
    #[serde(default)]
    pub model: Option<String>,
    pub messages: Vec<ChatMessagePayload>,
}

/// The model's reply plus the commands found in its code block.
#[derive(Serialize, Debug)]
pub struct GenerateCommandsResponse {
    pub content: String,
    pub commands: Vec<CommandPayload>,
    pub model: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SearchCommandsRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub command: String,
    pub similarity: f32,
}

#[derive(Serialize, Debug)]
pub struct SearchCommandsResponse {
    pub results: Vec<SearchResult>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Sends a client-built conversation to the LLM and extracts the commands of its reply.
pub async fn generate_commands_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<GenerateCommandsRequest>,
) -> Result<Json<GenerateCommandsResponse>, (StatusCode, String)> {
    if request.messages.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "messages must not be empty".to_string(),
        ));
    }

    let messages = request
        .messages
        .into_iter()
        .map(to_domain_message)
        .collect::<Result<Vec<_>, _>>()?;

    let model = request
        .model
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| app_state.generation_model.clone());

    info!(%model, turns = messages.len(), "Generating commands.");
    let content = app_state
        .llm
        .complete(&model, &messages, GENERATION_TEMPERATURE)
        .await
        .map_err(|e| {
            error!("Command generation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate commands".to_string(),
            )
        })?;

    let commands = app_state.extractor.extract_commands(&content).map_err(|e| {
        error!("Failed to extract commands from the reply: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to extract commands".to_string(),
        )
    })?;

    Ok(Json(GenerateCommandsResponse {
        content,
        commands: commands.into_iter().map(CommandPayload::from).collect(),
        model,
    }))
}

/// Ranks catalog commands against a free-text query.
pub async fn search_commands_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<SearchCommandsRequest>,
) -> Result<Json<SearchCommandsResponse>, (StatusCode, String)> {
    let top_k = request
        .top_k
        .unwrap_or(DEFAULT_SEARCH_RESULTS)
        .min(MAX_SEARCH_RESULTS);

    let matches = app_state
        .retriever
        .search_commands(&request.query, top_k)
        .await
        .map_err(|e| {
            error!("Command search failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to search commands".to_string(),
            )
        })?;

    let results = matches
        .into_iter()
        .map(|m| SearchResult {
            command: m.command,
            similarity: m.similarity,
        })
        .collect();

    Ok(Json(SearchCommandsResponse { results }))
}

fn to_domain_message(payload: ChatMessagePayload) -> Result<Message, (StatusCode, String)> {
    match payload.role.as_str() {
        "system" => Ok(Message::system(payload.content)),
        "user" => Ok(Message::user(payload.content)),
        "assistant" => Ok(Message::assistant(payload.content)),
        other => Err((
            StatusCode::BAD_REQUEST,
            format!("Unsupported message role: {}", other),
        )),
    }
}
