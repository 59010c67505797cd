//! WebSocket connection handler
//!
//! Each connection runs as a pair of tasks sharing a one-shot close signal:
//! a read pump decoding frames and dispatching requests, and a write pump
//! draining the session mailbox. The write pump is the only task that
//! touches the outbound half of the socket; frame decode failures answer
//! with a reject and keep the connection open, transport failures fire the
//! close signal.

use crate::connection::{CloseSignal, Session};
use crate::handlers::{reject_frame, RequestDispatcher};
use crate::protocol::frame;
use crate::server::GatewayState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Query parameters accepted at upgrade time
#[derive(Debug, Deserialize)]
pub(super) struct ConnectParams {
    token: Option<String>,
}

/// Upgrade an HTTP request to the gateway WebSocket
pub(super) async fn gateway_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<GatewayState>,
) -> impl IntoResponse {
    // The 8 KiB frame cap is enforced here; oversized messages fail the read.
    ws.max_message_size(crate::protocol::MAX_FRAME_LEN)
        .on_upgrade(move |socket| handle_socket(socket, state, params.token))
}

async fn handle_socket(mut socket: WebSocket, state: GatewayState, token: Option<String>) {
    let user_id = match &token {
        Some(token) => state.auth().validate_session(token).await,
        None => None,
    };
    let Some(user_id) = user_id else {
        tracing::debug!("Connection rejected: authentication failed");
        let _ = socket
            .send(Message::Binary(reject_frame("Authentication failed")))
            .await;
        let _ = socket.close().await;
        return;
    };

    let (mailbox_tx, mailbox_rx) = mpsc::channel(state.config().mailbox_capacity);
    let session = match state.registry().add(user_id, mailbox_tx) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Failed to allocate session ID");
            let _ = socket.close().await;
            return;
        }
    };

    tracing::info!(
        session_id = %session.id(),
        user_id = %user_id,
        "Connection established"
    );

    let close = Arc::new(CloseSignal::new());
    let (sink, stream) = socket.split();

    let read = tokio::spawn(read_pump(
        state.clone(),
        session.clone(),
        close.clone(),
        stream,
    ));
    let write = tokio::spawn(write_pump(
        state.clone(),
        session.clone(),
        close,
        sink,
        mailbox_rx,
    ));

    // Both pumps exit once either fires the close signal.
    let _ = tokio::join!(read, write);

    state.registry().remove(session.id());
    tracing::info!(
        session_id = %session.id(),
        user_id = %user_id,
        age = ?session.age(),
        "Connection closed"
    );
}

async fn read_pump(
    state: GatewayState,
    session: Arc<Session>,
    close: Arc<CloseSignal>,
    mut stream: SplitStream<WebSocket>,
) {
    let mut listener = close.listener();
    let read_timeout = Duration::from_millis(state.config().read_timeout_ms);

    loop {
        let message = tokio::select! {
            () = listener.closed() => break,
            next = timeout(read_timeout, stream.next()) => match next {
                Ok(Some(Ok(message))) => message,
                Ok(Some(Err(e))) => {
                    tracing::debug!(session_id = %session.id(), error = %e, "Socket read error");
                    break;
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::debug!(session_id = %session.id(), "Read timeout, closing idle connection");
                    break;
                }
            },
        };

        match message {
            Message::Binary(data) => {
                let (type_code, payload) = match frame::decode(&data) {
                    Ok(parts) => parts,
                    Err(e) => {
                        tracing::debug!(session_id = %session.id(), error = %e, "Malformed frame");
                        if session.send(reject_frame("Malformed frame")).await.is_err() {
                            break;
                        }
                        continue;
                    }
                };

                let outcome =
                    RequestDispatcher::dispatch(&state, &session, type_code, payload).await;
                if let Some(reply) = outcome.reply {
                    if session.send(reply).await.is_err() {
                        break;
                    }
                }
                if let Some(intent) = outcome.intent {
                    if state.intents().send(intent).await.is_err() {
                        break;
                    }
                }
            }
            Message::Text(_) => {
                if session.send(reject_frame("Binary frames only")).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    close.trigger();
}

async fn write_pump(
    state: GatewayState,
    session: Arc<Session>,
    close: Arc<CloseSignal>,
    mut sink: SplitSink<WebSocket, Message>,
    mut mailbox: mpsc::Receiver<Vec<u8>>,
) {
    let mut listener = close.listener();
    let write_timeout = Duration::from_millis(state.config().write_timeout_ms);
    let mut keepalive = tokio::time::interval(Duration::from_millis(
        state.config().keepalive_interval_ms,
    ));
    keepalive.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; consume it so the first ping waits a
    // full interval.
    keepalive.tick().await;

    loop {
        tokio::select! {
            () = listener.closed() => break,
            frame = mailbox.recv() => {
                let Some(frame) = frame else { break };
                match timeout(write_timeout, sink.send(Message::Binary(frame))).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::debug!(session_id = %session.id(), error = %e, "Socket write error");
                        break;
                    }
                    Err(_) => {
                        tracing::debug!(session_id = %session.id(), "Write timeout, peer too slow");
                        break;
                    }
                }
            }
            _ = keepalive.tick() => {
                match timeout(write_timeout, sink.send(Message::Ping(Vec::new()))).await {
                    Ok(Ok(())) => {}
                    _ => break,
                }
            }
        }
    }

    close.trigger();
    // Sole owner of the outbound half; best-effort close handshake.
    let _ = sink.close().await;
}
