//! Room channel: WebSocket upgrade and the two per-connection pumps.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::{
    sync::mpsc,
    time::{self, Instant},
};

use crate::{
    domain::{RoomId, User, UserId},
    infrastructure::dto::websocket::ClientMessage,
    room::{GameRoom, InboundMessage, OutboundFrame, OutboundReceiver},
    ui::state::AppState,
};

use super::{auth::CurrentUser, error::ApiError};

/// Largest accepted client frame, in bytes.
pub const MAX_MESSAGE_SIZE: usize = 4096;

pub async fn channel_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(room_id): Path<i64>,
) -> Result<Response, ApiError> {
    let room = state
        .open_channel_usecase
        .execute(RoomId::new(room_id), &user)
        .await?;
    let ping_interval = state.timings.ping_interval;
    let read_timeout = state.timings.read_timeout;
    Ok(ws
        .max_message_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_socket(socket, room, user, ping_interval, read_timeout)))
}

/// Classify a text frame.
///
/// Returns `None` for frames that are not JSON at all; those are skipped.
/// JSON that is not a known message becomes `Some(Err(reason))` so the room
/// can answer with an error.
pub fn parse_client_message(text: &str) -> Option<Result<ClientMessage, String>> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Skipping frame that is not JSON: {}", e);
            return None;
        }
    };
    Some(serde_json::from_value(value).map_err(|e| e.to_string()))
}

async fn handle_socket(
    socket: WebSocket,
    room: Arc<GameRoom>,
    user: User,
    ping_interval: Duration,
    read_timeout: Duration,
) {
    let user_id = user.id;
    let (sender, receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let conn_id = room.join(user, tx).await;

    let mut send_task = tokio::spawn(pusher_loop(rx, sender, ping_interval));
    let mut recv_task = tokio::spawn(reader_loop(
        receiver,
        Arc::clone(&room),
        user_id,
        read_timeout,
    ));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    room.lost(user_id, conn_id);
}

/// Drain the connection's delivery queue to the wire, pinging in between.
async fn pusher_loop(
    mut rx: OutboundReceiver,
    mut sender: SplitSink<WebSocket, Message>,
    ping_interval: Duration,
) {
    let mut ping = time::interval_at(Instant::now() + ping_interval, ping_interval);
    loop {
        tokio::select! {
            frame = rx.recv() => match frame {
                Some(OutboundFrame::Text(text)) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Some(OutboundFrame::Close) | None => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            },
            _ = ping.tick() => {
                if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Forward client frames to the room until the peer goes quiet or away.
async fn reader_loop(
    mut receiver: SplitStream<WebSocket>,
    room: Arc<GameRoom>,
    user_id: UserId,
    read_timeout: Duration,
) {
    loop {
        let frame = match time::timeout(read_timeout, receiver.next()).await {
            Err(_) => {
                tracing::info!("User {}: no frame for {:?}, dropping", user_id, read_timeout);
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                tracing::warn!("User {}: WebSocket error: {}", user_id, e);
                break;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        match frame {
            Message::Text(text) => {
                tracing::debug!("User {}: received {}", user_id, text.as_str());
                let Some(message) = parse_client_message(text.as_str()) else {
                    continue;
                };
                if !room.submit(InboundMessage { user_id, message }).await {
                    break;
                }
            }
            Message::Close(_) => {
                tracing::info!("User {} requested close", user_id);
                break;
            }
            // Pongs and pings only refresh the read deadline
            _ => {}
        }
    }
}
