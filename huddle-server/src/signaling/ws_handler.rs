use crate::room::{RoomCommand, RoomManager};
use crate::signaling::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::ParticipantId;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// How many times join registration is retried when it races with an idle
/// room being reaped.
const JOIN_ATTEMPTS: usize = 4;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, room_id, state.rooms))
}

async fn handle_socket(socket: WebSocket, room_id: String, rooms: RoomManager) {
    let participant_id = ParticipantId::new();
    info!(room = %room_id, participant = %participant_id, "new participant connection");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let Some(room_tx) = join_room(&rooms, &room_id, participant_id, tx).await else {
        warn!(room = %room_id, "join rejected, closing socket");
        return;
    };

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let room_tx = room_tx.clone();

        async move {
            while let Some(Ok(msg)) = ws_rx.next().await {
                match msg {
                    // Envelopes are opaque to the relay: Text and Binary
                    // frames are forwarded verbatim, never parsed.
                    Message::Text(_) | Message::Binary(_) => {
                        let cmd = RoomCommand::Relay {
                            sender_id: participant_id,
                            frame: msg,
                        };
                        if room_tx.send(cmd).await.is_err() {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Single leave path for both clean closes and abnormal drops.
    let _ = room_tx.send(RoomCommand::Leave { participant_id }).await;
    info!(room = %room_id, participant = %participant_id, "participant disconnected");
}

/// Register the connection with its room. A resolved sender can belong to a
/// room that just reaped itself; in that case the send fails and resolution
/// is retried, which spawns a fresh room.
async fn join_room(
    rooms: &RoomManager,
    room_id: &str,
    participant_id: ParticipantId,
    tx: mpsc::UnboundedSender<Message>,
) -> Option<mpsc::Sender<RoomCommand>> {
    for _ in 0..JOIN_ATTEMPTS {
        let room_tx = rooms.room_sender(room_id)?;
        let cmd = RoomCommand::Join {
            participant_id,
            tx: tx.clone(),
        };

        if room_tx.send(cmd).await.is_ok() {
            return Some(room_tx);
        }
    }

    warn!(room = %room_id, "could not register with room");
    None
}
