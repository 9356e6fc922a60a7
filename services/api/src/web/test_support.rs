//! Shared fakes for the web-layer tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use geogebra_assistant_core::{
    domain::{Message, Role},
    ports::{ChatCompletionService, CommandCorrector, PortError, PortResult},
    BaselinePrompts, RegenerationService,
};

use crate::{
    adapters::{CodeBlockExtractor, CommandCatalogRetriever},
    web::state::AppState,
};

pub const GENERATION_MODEL: &str = "gpt-4o-mini";

pub const REGENERATED_REPLY: &str =
    "1. Define the center A.\n2. Draw the circle.\n```\nA(0,0)\nCircle(A, 3)\n```";

pub struct ScriptedLlm {
    pub reply: String,
    fail: bool,
    calls: Mutex<Vec<(String, Vec<Message>)>>,
}

impl ScriptedLlm {
    /// The user message of every call, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(_, messages)| messages.iter().rev().find(|m| m.role == Role::User))
            .map(|m| m.content.clone())
            .collect()
    }

    /// Every call as (model, messages), in call order.
    pub fn calls(&self) -> Vec<(String, Vec<Message>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletionService for ScriptedLlm {
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        _temperature: f32,
    ) -> PortResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), messages.to_vec()));
        if self.fail {
            return Err(PortError::Unexpected("upstream timed out".to_string()));
        }
        Ok(self.reply.clone())
    }
}

pub struct RecordingCorrector {
    fail: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingCorrector {
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandCorrector for RecordingCorrector {
    async fn correct_command(&self, command: &str, error: &str) -> PortResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), error.to_string()));
        if self.fail {
            return Err(PortError::Unexpected("corrector unavailable".to_string()));
        }
        Ok("Circle(A, 3)".to_string())
    }
}

pub struct TestHarness {
    pub app_state: AppState,
    pub llm: Arc<ScriptedLlm>,
    pub corrector: Arc<RecordingCorrector>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::build(false, false)
    }

    pub fn with_failing_llm() -> Self {
        Self::build(true, false)
    }

    pub fn with_failing_corrector() -> Self {
        Self::build(false, true)
    }

    fn build(llm_fails: bool, corrector_fails: bool) -> Self {
        let llm = Arc::new(ScriptedLlm {
            reply: REGENERATED_REPLY.to_string(),
            fail: llm_fails,
            calls: Mutex::new(Vec::new()),
        });
        let corrector = Arc::new(RecordingCorrector {
            fail: corrector_fails,
            calls: Mutex::new(Vec::new()),
        });
        let retriever = Arc::new(CommandCatalogRetriever::bundled().unwrap());
        let extractor = Arc::new(CodeBlockExtractor::new().unwrap());
        let regeneration = RegenerationService::new(
            retriever.clone(),
            extractor.clone(),
            llm.clone(),
            BaselinePrompts::default(),
            "gpt-4o-mini".to_string(),
        );
        let app_state = AppState {
            regeneration: Arc::new(regeneration),
            corrector: corrector.clone(),
            llm: llm.clone(),
            extractor,
            retriever,
            generation_model: GENERATION_MODEL.to_string(),
        };
        Self {
            app_state,
            llm,
            corrector,
        }
    }
}
