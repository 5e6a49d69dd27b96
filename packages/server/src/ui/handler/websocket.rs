//! WebSocket connection handlers.
//!
//! The handshake (credential check, room authorization) runs before the
//! upgrade: a rejected client gets a plain HTTP status and never holds a
//! socket. Once upgraded, the session joins its room before the first frame
//! is read.

use std::sync::Arc;

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::Response,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{MaterialId, RoomTarget, SessionState, UserId},
    ui::state::AppState,
    usecase::{Admission, ChatSession, FrameOutcome},
};

use super::{credential, status_for};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

/// `GET /ws/material/{material_id}/`
pub async fn material_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(material_id): Path<String>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let material_id = match material_id.parse::<MaterialId>() {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Rejected material route: {}", e);
            return Err(StatusCode::NOT_FOUND);
        }
    };
    let token = credential(query.token, &headers);
    connect(ws, state, RoomTarget::Material(material_id), token).await
}

/// `GET /ws/direct/{other_user_id}/`
pub async fn direct_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(other_user_id): Path<String>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let peer = match other_user_id.parse::<UserId>() {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Rejected direct route: {}", e);
            return Err(StatusCode::NOT_FOUND);
        }
    };
    let token = credential(query.token, &headers);
    connect(ws, state, RoomTarget::Direct(peer), token).await
}

/// Move the session state machine forward, closing on an illegal edge
fn advance(state: SessionState, next: SessionState) -> SessionState {
    state.transition(next).unwrap_or_else(|e| {
        tracing::error!("{}", e);
        SessionState::Closed
    })
}

async fn connect(
    ws: WebSocketUpgrade,
    state: Arc<AppState>,
    target: RoomTarget,
    token: Option<String>,
) -> Result<Response, StatusCode> {
    let phase = SessionState::Connecting;

    match state
        .connect_participant_usecase
        .execute(token.as_deref(), target)
        .await
    {
        Ok(admission) => {
            let phase = advance(phase, SessionState::Authenticated);
            tracing::info!(
                "User {} admitted to {}",
                admission.identity.user_id,
                admission.room
            );
            Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, admission, phase)))
        }
        Err(e) => {
            tracing::warn!("Handshake rejected ({:?}): {}", target, e);
            Err(status_for(&e))
        }
    }
}

/// Spawns a task that drains the session's outbound queue into the WebSocket sender.
///
/// The task ends when the queue is closed (the session left the registry or
/// was reaped) or when the socket stops accepting frames.
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    })
}

/// Reads inbound frames strictly one at a time.
///
/// Each frame is handled on its own task and awaited, so a store write that
/// has started runs to completion even if this loop is aborted.
fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    chat: Arc<ChatSession>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error: {}", e);
                    break;
                }
            };

            let handled = match msg {
                Message::Text(text) => {
                    let chat = chat.clone();
                    let text = text.as_str().to_owned();
                    tokio::spawn(async move { chat.handle_text(&text).await }).await
                }
                Message::Binary(_) => {
                    let chat = chat.clone();
                    tokio::spawn(async move { chat.handle_binary().await }).await
                }
                Message::Close(_) => {
                    tracing::debug!("Session {} requested close", chat.session().id);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                Message::Ping(_) | Message::Pong(_) => continue,
            };

            match handled {
                Ok(FrameOutcome::Sent(message)) => {
                    tracing::debug!("Session {} sent message {}", chat.session().id, message.id)
                }
                Ok(FrameOutcome::Relayed { delivered }) => {
                    tracing::debug!(
                        "Session {} relayed a signal to {} session(s)",
                        chat.session().id,
                        delivered
                    )
                }
                Ok(FrameOutcome::Rejected(reason)) => {
                    tracing::debug!("Session {} frame rejected: {}", chat.session().id, reason)
                }
                Err(e) => {
                    tracing::error!("Frame handler of session {} failed: {}", chat.session().id, e)
                }
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    admission: Admission,
    phase: SessionState,
) {
    let (sender, receiver) = socket.split();
    let (tx, rx) = mpsc::channel(state.outbound_buffer);

    // Join before reading any frame
    let session = state.connect_participant_usecase.join(admission, tx).await;
    let phase = advance(phase, SessionState::Joined);
    tracing::info!(
        "Session {} of user {} joined {} ({})",
        session.id,
        session.identity.user_id,
        session.room,
        phase.name()
    );

    if phase.accepts_events() {
        let chat = Arc::new(ChatSession::new(
            session.clone(),
            state.send_message_usecase.clone(),
            state.relay_signal_usecase.clone(),
            state.registry.clone(),
        ));

        let mut recv_task = receive_loop(receiver, chat);
        let mut send_task = pusher_loop(rx, sender);

        // If any one of the tasks completes, abort the other
        tokio::select! {
            _ = &mut recv_task => send_task.abort(),
            _ = &mut send_task => recv_task.abort(),
        };
    } else {
        tracing::error!(
            "Session {} cannot take events while {}, dropping it",
            session.id,
            phase.name()
        );
    }

    let removed = state.disconnect_participant_usecase.execute(&session).await;
    let phase = advance(phase, SessionState::Closed);
    tracing::info!(
        "Session {} left {} ({}{})",
        session.id,
        session.room,
        phase.name(),
        if removed { "" } else { ", already reaped" }
    );
}
