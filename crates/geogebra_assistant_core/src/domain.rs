//! crates/geogebra_assistant_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

/// The author of a single message in an LLM conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged entry of the conversation sent to the LLM.
///
/// Order inside a `Vec<Message>` is the literal conversation order; messages are
/// never merged or deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A single GeoGebra command invocation pulled out of LLM output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    /// The invoked command, e.g. `Circle` for `c = Circle(A, 3)`.
    /// `None` when the line is not call-style.
    pub name: Option<String>,
    /// The full command line as GeoGebra should evaluate it.
    pub syntax: String,
}

/// A command that matched a search, with its relevance as a percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandMatch {
    pub command: String,
    pub similarity: f32,
}

/// A freshly regenerated explanation together with its extracted commands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegenerationResult {
    pub content: String,
    pub commands: Vec<CommandRecord>,
}
