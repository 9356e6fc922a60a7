//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the hosted chat-completion LLM.
//! It implements the `ChatCompletionService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use geogebra_assistant_core::{
    domain::{Message, Role},
    ports::{ChatCompletionService, PortError, PortResult},
};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ChatCompletionService` using an OpenAI-compatible API.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
}

impl OpenAiChatAdapter {
    /// Creates a new `OpenAiChatAdapter`.
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }
}

fn to_request_message(message: &Message) -> PortResult<ChatCompletionRequestMessage> {
    let request_message = match message.role {
        Role::System => ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(message.content.as_str())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?,
        ),
        Role::User => ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.as_str())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?,
        ),
        Role::Assistant => ChatCompletionRequestMessage::Assistant(
            ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.content.as_str())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?,
        ),
    };
    Ok(request_message)
}

//=========================================================================================
// `ChatCompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatCompletionService for OpenAiChatAdapter {
    /// Sends the conversation as-is and returns the text of the first choice.
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        temperature: f32,
    ) -> PortResult<String> {
        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<PortResult<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(request_messages)
            .temperature(temperature)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!(model, messages = messages.len(), "Sending chat completion request");

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            PortError::InvalidResponse("LLM returned no choices in its response.".to_string())
        })?;

        choice.message.content.ok_or_else(|| {
            PortError::InvalidResponse("LLM response contained no text content.".to_string())
        })
    }
}
