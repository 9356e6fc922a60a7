//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for the GeoGebra command assistant. Every frame is a JSON text message with a
//! `type` discriminator.

use geogebra_assistant_core::domain::{CommandRecord, RegenerationResult};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Acknowledgement sent after a query has been stored.
pub const QUERY_SAVED_MESSAGE: &str = "Query saved.";
/// Acknowledgement sent after the client reports a successful command.
pub const COMMAND_SUCCEEDED_MESSAGE: &str = "Command executed successfully.";

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// The outcome of running one command in the client's GeoGebra applet.
/// Absent or `null` fields fall back to their defaults; mistyped ones are coerced.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub command: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub regenerate_full: bool,
}

#[derive(Deserialize)]
struct QueryPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    query: String,
}

/// Represents the structured text messages a client can send to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Stores the user's natural-language request for later regeneration.
    Query { query: String },

    /// Reports whether a generated command ran in the client's applet.
    CommandResult(CommandResult),

    /// Any other `type`; the raw type is kept so it can be echoed back.
    Unknown { message_type: String },
}

impl ClientMessage {
    /// Parses a text frame. Anything that is not a JSON object is an error.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(de::Error::custom("client message must be a JSON object"));
        }

        let message_type = match value.get("type") {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => String::new(),
            Some(other) => other.to_string(),
        };

        match message_type.as_str() {
            "query" => {
                let payload: QueryPayload = serde_json::from_value(value)?;
                Ok(Self::Query {
                    query: payload.query,
                })
            }
            "command_result" => Ok(Self::CommandResult(serde_json::from_value(value)?)),
            _ => Ok(Self::Unknown { message_type }),
        }
    }
}

/// Text fields: `null` and `false` are empty, other values use their JSON text.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Flag fields follow JSON truthiness: `null`, `0`, `""`, `[]` and `{}` are false.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// A command as the client receives it inside a `full_correction`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommandPayload {
    pub name: Option<String>,
    pub syntax: String,
}

impl From<CommandRecord> for CommandPayload {
    fn from(record: CommandRecord) -> Self {
        Self {
            name: record.name,
            syntax: record.syntax,
        }
    }
}

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Acknowledges a stored query or a successfully executed command.
    Confirmation {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        command: Option<String>,
    },

    /// A regenerated explanation and command list replacing the previous answer.
    FullCorrection {
        content: String,
        commands: Vec<CommandPayload>,
        original_command: String,
        error: String,
    },

    /// A replacement for a single failed command.
    CommandCorrection {
        original: String,
        corrected: String,
        error: String,
    },

    /// Reports a problem with the client's message.
    Error { message: String },
}

impl ServerMessage {
    pub fn full_correction(result: RegenerationResult, original_command: String, error: String) -> Self {
        Self::FullCorrection {
            content: result.content,
            commands: result.commands.into_iter().map(CommandPayload::from).collect(),
            original_command,
            error,
        }
    }
}
