//! WebSocket connection handlers: connection lifecycle plus the frame
//! router.
//!
//! Each connection is served by two tasks: a reader that decodes inbound
//! frames and dispatches them to the command use cases, and a writer that
//! drains the connection's mpsc channel into the socket. Registry mutation
//! happens inside the use cases; the handler only routes and maps errors to
//! wire replies.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use kakehashi_shared::wire::{self, Command, ErrorCode, Frame};

use crate::domain::UserId;
use crate::ui::state::AppState;
use crate::usecase::{JoinError, LeaveError, RelayError};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, addr))
}

/// Spawns the writer task: frames queued on the rx channel are forwarded to
/// the socket. When the channel closes (the user was unregistered), the
/// writer attempts a graceful close; if that fails the socket is simply
/// dropped, which terminates the connection.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                // Socket is dead; cleanup runs from the connection handler.
                return;
            }
        }
        if let Err(e) = sender.send(Message::Close(None)).await {
            tracing::warn!("Failed to close connection gracefully, terminating: {}", e);
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, addr: SocketAddr) {
    let (tx, rx) = mpsc::unbounded_channel();
    let addr = format!("{}|{}", addr.ip(), addr.port());

    // Register the user and announce its identity.
    let outcome = match state.connect_user_usecase.execute(addr, tx).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Failed to register connection: {}", e);
            return;
        }
    };
    let user_id = outcome.user.id.clone();

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);

    if !outcome.ident_delivered {
        state.disconnect_user_usecase.execute(&user_id).await;
        let _ = send_task.await;
        return;
    }

    let state_clone = state.clone();
    let user_id_clone = user_id.clone();

    // Reader task: decode and dispatch until the connection ends or a
    // protocol violation makes it untrustworthy.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error for '{}': {}", user_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!(">{}", text.as_str());
                    let frame = match wire::decode_frame(&text) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::warn!(
                                "Protocol violation from '{}': {}",
                                user_id_clone,
                                e
                            );
                            break;
                        }
                    };
                    if !dispatch(&state_clone, &user_id_clone, frame).await {
                        break;
                    }
                }
                Message::Binary(_) => {
                    tracing::warn!(
                        "Protocol violation from '{}': binary frame",
                        user_id_clone
                    );
                    break;
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", user_id_clone);
                    break;
                }
                // WebSocket ping/pong is handled by the protocol layer.
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
    });

    tokio::select! {
        _ = &mut recv_task => {
            // Unregistering drops the connection's sender; the writer drains
            // what is queued, closes the socket, and exits.
            state.disconnect_user_usecase.execute(&user_id).await;
            let _ = send_task.await;
        }
        _ = &mut send_task => {
            recv_task.abort();
            state.disconnect_user_usecase.execute(&user_id).await;
        }
    };

    tracing::info!("Connection of '{}' closed", user_id);
}

/// Route one decoded frame to its command handler. Returns `false` when the
/// connection should be dropped.
async fn dispatch(state: &Arc<AppState>, user_id: &UserId, frame: Frame) -> bool {
    let Frame { seq, command } = frame;

    match command {
        Command::Join { channel } => {
            match state.join_channel_usecase.execute(user_id, channel).await {
                Ok(outcome) => drop_failed(state, user_id, outcome.failed).await,
                Err(JoinError::ChannelNotFound(name)) => {
                    reply_error(state, user_id, &seq, ErrorCode::NoSuchTarget, Some(&name))
                        .await
                }
            }
        }
        Command::Leave { channel } => {
            match state.leave_channel_usecase.execute(user_id, channel).await {
                Ok(outcome) => drop_failed(state, user_id, outcome.failed).await,
                Err(e) => {
                    let code = match e {
                        LeaveError::MissingChannel => ErrorCode::InvalidArgument,
                        LeaveError::ChannelNotFound(_) => ErrorCode::NoSuchTarget,
                        LeaveError::NotInChannel(_) => ErrorCode::NotInChannel,
                    };
                    reply_error(state, user_id, &seq, code, None).await
                }
            }
        }
        Command::Msg { target, payload } => {
            match state
                .relay_message_usecase
                .execute(user_id, target, payload)
                .await
            {
                Ok(outcome) => drop_failed(state, user_id, outcome.failed).await,
                Err(RelayError::MissingTarget) => {
                    reply_error(state, user_id, &seq, ErrorCode::NoSuchTarget, None).await
                }
                Err(RelayError::TargetNotFound(target)) => {
                    reply_error(
                        state,
                        user_id,
                        &seq,
                        ErrorCode::NoSuchTarget,
                        Some(&target),
                    )
                    .await
                }
            }
        }
        Command::Ping { payload } => {
            let reply = wire::pong_reply(&seq, &payload);
            push_direct(state, user_id, &reply).await
        }
    }
}

/// Disconnect every recipient whose delivery failed. Returns `false` when
/// the current connection itself is among them.
async fn drop_failed(state: &Arc<AppState>, self_id: &UserId, failed: Vec<UserId>) -> bool {
    let mut keep_going = true;
    for id in failed {
        if id == *self_id {
            keep_going = false;
        }
        state.disconnect_user_usecase.execute(&id).await;
    }
    keep_going
}

async fn reply_error(
    state: &Arc<AppState>,
    user_id: &UserId,
    seq: &serde_json::Value,
    code: ErrorCode,
    target: Option<&str>,
) -> bool {
    let reply = wire::error_reply(seq, code, target);
    push_direct(state, user_id, &reply).await
}

/// Push a direct reply to the command's own connection. A failed push means
/// that connection is gone.
async fn push_direct(state: &Arc<AppState>, user_id: &UserId, frame: &str) -> bool {
    match state.message_pusher.push_to(user_id, frame).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to reply to '{}': {}", user_id, e);
            false
        }
    }
}
