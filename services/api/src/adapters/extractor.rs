//! services/api/src/adapters/extractor.rs
//!
//! Pulls GeoGebra commands out of the fenced code blocks in an LLM answer.
//! It implements the `CommandExtractor` port from the `core` crate.

use geogebra_assistant_core::{
    domain::CommandRecord,
    ports::{CommandExtractor, PortError, PortResult},
};
use regex::Regex;

// A language tag only counts when it sits alone on the fence line, so the
// few-shot style "```A(0,0)" keeps its first command.
const CODE_BLOCK_PATTERN: &str = r"(?s)```(?:[A-Za-z][\w-]*[ \t]*\r?\n)?(.*?)```";
const COMMAND_NAME_PATTERN: &str = r"^(?:[A-Za-z_][\w']*\s*[:=]\s*)?([A-Za-z][A-Za-z0-9_]*)\s*[(\[]";

/// Extracts one `CommandRecord` per non-empty line of every fenced code block.
pub struct CodeBlockExtractor {
    code_block: Regex,
    command_name: Regex,
}

impl CodeBlockExtractor {
    pub fn new() -> PortResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| PortError::Unexpected(e.to_string()))
        };
        Ok(Self {
            code_block: compile(CODE_BLOCK_PATTERN)?,
            command_name: compile(COMMAND_NAME_PATTERN)?,
        })
    }

    fn to_record(&self, line: &str) -> CommandRecord {
        let name = self
            .command_name
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
        CommandRecord {
            name,
            syntax: line.to_string(),
        }
    }
}

impl CommandExtractor for CodeBlockExtractor {
    fn extract_commands(&self, raw_text: &str) -> PortResult<Vec<CommandRecord>> {
        Ok(self
            .code_block
            .captures_iter(raw_text)
            .filter_map(|caps| caps.get(1))
            .flat_map(|block| block.as_str().lines())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| self.to_record(line))
            .collect())
    }
}
