use axum::extract::ws::Message;
use huddle_core::ParticipantId;
use tokio::sync::mpsc;

/// Commands flowing from the WebSocket handlers into a room's event loop.
#[derive(Debug)]
pub enum RoomCommand {
    /// A connection joined the room; `tx` is its outbound frame queue.
    Join {
        participant_id: ParticipantId,
        tx: mpsc::UnboundedSender<Message>,
    },

    /// Forward a frame to every other participant, verbatim.
    Relay {
        sender_id: ParticipantId,
        frame: Message,
    },

    /// The connection closed, cleanly or not.
    Leave { participant_id: ParticipantId },
}
