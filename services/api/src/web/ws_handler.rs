//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! Each connection processes one client message at a time, including any LLM
//! round-trip, before reading the next one.

use crate::{
    error::ApiError,
    web::{
        protocol::ClientMessage,
        session::handle_client_message,
        state::{AppState, SessionState},
    },
};
use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, Utf8Bytes, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    let (sender, receiver) = socket.split();

    run_session(&app_state, receiver, sender)
        .instrument(info_span!("ws", %connection_id))
        .await;
}

/// Drives one connection until the client leaves or a fatal error occurs.
///
/// Fatal errors are logged and answered with a close frame carrying code 1011;
/// their text never reaches the client.
pub async fn run_session<S, K>(app_state: &AppState, mut receiver: S, mut sender: K)
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
    K: Sink<Message> + Unpin,
{
    info!("New WebSocket connection established.");
    let mut session = SessionState::default();

    match message_loop(app_state, &mut session, &mut receiver, &mut sender).await {
        Ok(()) => info!("WebSocket connection closed."),
        Err(e) => {
            error!("WebSocket error: {}", e);
            let frame = CloseFrame {
                code: close_code::ERROR,
                reason: Utf8Bytes::from_static("internal server error"),
            };
            if sender.send(Message::Close(Some(frame))).await.is_err() {
                warn!("Failed to send close frame.");
            }
        }
    }
}

async fn message_loop<S, K>(
    app_state: &AppState,
    session: &mut SessionState,
    receiver: &mut S,
    sender: &mut K,
) -> Result<(), ApiError>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
    K: Sink<Message> + Unpin,
{
    loop {
        let text = match receiver.next().await {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Binary(_))) => {
                return Err(ApiError::Internal(
                    "binary frames are not supported".to_string(),
                ))
            }
            Some(Ok(Message::Close(_))) => {
                info!("Client sent close message.");
                return Ok(());
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                info!("Client connection dropped: {}", e);
                return Ok(());
            }
            None => {
                info!("Client disconnected.");
                return Ok(());
            }
        };

        let client_msg = ClientMessage::parse(text.as_str())?;
        let reply = handle_client_message(app_state, session, client_msg).await?;
        let reply_json = serde_json::to_string(&reply)?;

        if sender.send(Message::Text(reply_json.into())).await.is_err() {
            info!("Client went away before the reply could be sent.");
            return Ok(());
        }
    }
}
