//! services/api/src/web/session.rs
//!
//! Handles one decoded client message: updates the session and decides which
//! single reply answers it.

use crate::{
    error::ApiError,
    web::{
        protocol::{
            ClientMessage, CommandResult, ServerMessage, COMMAND_SUCCEEDED_MESSAGE,
            QUERY_SAVED_MESSAGE,
        },
        state::{AppState, SessionState},
    },
};
use tracing::{info, warn};

/// Processes a message to completion and returns the reply for the client.
///
/// Errors are fatal to the connection; regeneration failures are not errors.
pub async fn handle_client_message(
    app_state: &AppState,
    session: &mut SessionState,
    message: ClientMessage,
) -> Result<ServerMessage, ApiError> {
    match message {
        ClientMessage::Query { query } => {
            info!("Stored user query: '{}'", query);
            session.user_query = query;
            Ok(ServerMessage::Confirmation {
                message: QUERY_SAVED_MESSAGE.to_string(),
                command: None,
            })
        }
        ClientMessage::CommandResult(result) => {
            handle_command_result(app_state, session, result).await
        }
        ClientMessage::Unknown { message_type } => {
            warn!("Received unknown message type: '{}'", message_type);
            Ok(ServerMessage::Error {
                message: format!("Unknown message type: {}", message_type),
            })
        }
    }
}

async fn handle_command_result(
    app_state: &AppState,
    session: &SessionState,
    result: CommandResult,
) -> Result<ServerMessage, ApiError> {
    let CommandResult {
        command,
        success,
        error,
        regenerate_full,
    } = result;

    if success {
        info!("Command executed successfully: {}", command);
        return Ok(ServerMessage::Confirmation {
            message: COMMAND_SUCCEEDED_MESSAGE.to_string(),
            command: Some(command),
        });
    }

    if error.is_empty() {
        warn!("Command '{}' reported as failed without an error message.", command);
        return Ok(ServerMessage::Error {
            message: format!("Command failed without an error message: {}", command),
        });
    }

    if regenerate_full && session.has_query() {
        info!("Full response regeneration requested: {}, error: {}", command, error);
        let regenerated = app_state
            .regeneration
            .regenerate(&session.user_query, &command, &error)
            .await
            .into_result();
        return Ok(ServerMessage::full_correction(regenerated, command, error));
    }

    info!("Correcting single command: {}, error: {}", command, error);
    let corrected = app_state.corrector.correct_command(&command, &error).await?;
    Ok(ServerMessage::CommandCorrection {
        original: command,
        corrected,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::TestHarness;

    fn command_result(command: &str, success: bool, error: &str, regenerate_full: bool) -> ClientMessage {
        ClientMessage::CommandResult(CommandResult {
            command: command.to_string(),
            success,
            error: error.to_string(),
            regenerate_full,
        })
    }

    #[tokio::test]
    async fn query_is_stored_and_acknowledged() {
        let harness = TestHarness::new();
        let mut session = SessionState::default();

        let reply = handle_client_message(
            &harness.app_state,
            &mut session,
            ClientMessage::Query {
                query: "draw a circle of radius 3".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(session.user_query, "draw a circle of radius 3");
        assert_eq!(
            reply,
            ServerMessage::Confirmation {
                message: QUERY_SAVED_MESSAGE.to_string(),
                command: None,
            }
        );
    }

    #[tokio::test]
    async fn regeneration_uses_the_latest_query() {
        let harness = TestHarness::new();
        let mut session = SessionState::default();

        for query in ["draw a square", "draw a circle of radius 3"] {
            handle_client_message(
                &harness.app_state,
                &mut session,
                ClientMessage::Query {
                    query: query.to_string(),
                },
            )
            .await
            .unwrap();
        }
        let reply = handle_client_message(
            &harness.app_state,
            &mut session,
            command_result("Circle(A,3,)", false, "syntax error", true),
        )
        .await
        .unwrap();

        assert_eq!(harness.llm.queries(), ["draw a circle of radius 3"]);
        let ServerMessage::FullCorrection {
            content,
            commands,
            original_command,
            error,
        } = reply
        else {
            panic!("expected a full correction, got {reply:?}");
        };
        assert_eq!(content, harness.llm.reply);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1].syntax, "Circle(A, 3)");
        assert_eq!(original_command, "Circle(A,3,)");
        assert_eq!(error, "syntax error");
        assert!(harness.corrector.calls().is_empty());
    }

    #[tokio::test]
    async fn regeneration_without_a_query_falls_back_to_single_correction() {
        let harness = TestHarness::new();
        let mut session = SessionState::default();

        let reply = handle_client_message(
            &harness.app_state,
            &mut session,
            command_result("Circle(A,3,)", false, "syntax error", true),
        )
        .await
        .unwrap();

        assert!(harness.llm.queries().is_empty());
        assert_eq!(
            harness.corrector.calls(),
            [("Circle(A,3,)".to_string(), "syntax error".to_string())]
        );
        assert_eq!(
            reply,
            ServerMessage::CommandCorrection {
                original: "Circle(A,3,)".to_string(),
                corrected: "Circle(A, 3)".to_string(),
                error: "syntax error".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn empty_query_counts_as_no_query() {
        let harness = TestHarness::new();
        let mut session = SessionState::default();

        handle_client_message(
            &harness.app_state,
            &mut session,
            ClientMessage::Query {
                query: String::new(),
            },
        )
        .await
        .unwrap();
        let reply = handle_client_message(
            &harness.app_state,
            &mut session,
            command_result("Circle(A,3,)", false, "syntax error", true),
        )
        .await
        .unwrap();

        assert!(matches!(reply, ServerMessage::CommandCorrection { .. }));
        assert!(harness.llm.queries().is_empty());
    }

    #[tokio::test]
    async fn single_correction_when_full_regeneration_is_not_requested() {
        let harness = TestHarness::new();
        let mut session = SessionState {
            user_query: "draw a circle".to_string(),
        };

        let reply = handle_client_message(
            &harness.app_state,
            &mut session,
            command_result("Circle(A,3,)", false, "syntax error", false),
        )
        .await
        .unwrap();

        assert!(matches!(reply, ServerMessage::CommandCorrection { .. }));
        assert!(harness.llm.queries().is_empty());
    }

    #[tokio::test]
    async fn success_is_confirmed_with_the_command() {
        let harness = TestHarness::new();
        let mut session = SessionState::default();

        let reply = handle_client_message(
            &harness.app_state,
            &mut session,
            command_result("Circle(A, 3)", true, "", false),
        )
        .await
        .unwrap();

        assert_eq!(
            reply,
            ServerMessage::Confirmation {
                message: COMMAND_SUCCEEDED_MESSAGE.to_string(),
                command: Some("Circle(A, 3)".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn failure_without_error_text_is_reported() {
        let harness = TestHarness::new();
        let mut session = SessionState::default();

        let reply = handle_client_message(
            &harness.app_state,
            &mut session,
            command_result("Circle(A,3,)", false, "", true),
        )
        .await
        .unwrap();

        let ServerMessage::Error { message } = reply else {
            panic!("expected an error reply, got {reply:?}");
        };
        assert!(message.contains("Circle(A,3,)"));
        assert!(harness.corrector.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_type_is_echoed_in_an_error() {
        let harness = TestHarness::new();
        let mut session = SessionState::default();

        let reply = handle_client_message(
            &harness.app_state,
            &mut session,
            ClientMessage::Unknown {
                message_type: "ping".to_string(),
            },
        )
        .await
        .unwrap();

        let ServerMessage::Error { message } = reply else {
            panic!("expected an error reply, got {reply:?}");
        };
        assert!(message.contains("ping"));
    }

    #[tokio::test]
    async fn gateway_failure_still_yields_a_full_correction() {
        let harness = TestHarness::with_failing_llm();
        let mut session = SessionState {
            user_query: "draw a circle".to_string(),
        };

        let reply = handle_client_message(
            &harness.app_state,
            &mut session,
            command_result("Circle(A,3,)", false, "syntax error", true),
        )
        .await
        .unwrap();

        let ServerMessage::FullCorrection {
            content, commands, ..
        } = reply
        else {
            panic!("expected a full correction, got {reply:?}");
        };
        assert!(commands.is_empty());
        assert!(content.starts_with("command correction failed: "));
    }

    #[tokio::test]
    async fn corrector_failure_is_fatal() {
        let harness = TestHarness::with_failing_corrector();
        let mut session = SessionState::default();

        let err = handle_client_message(
            &harness.app_state,
            &mut session,
            command_result("Circle(A,3,)", false, "syntax error", false),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::Port(_)));
    }
}
