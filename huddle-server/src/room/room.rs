use crate::room::RoomCommand;
use axum::extract::ws::Message;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use huddle_core::ParticipantId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// One room's event loop. The room is a pure store-nothing router: frames
/// are forwarded to the other participants exactly as received, never
/// parsed, never buffered past delivery.
pub struct Room {
    id: String,
    participants: HashMap<ParticipantId, mpsc::UnboundedSender<Message>>,
    command_rx: mpsc::Receiver<RoomCommand>,
    grace: Duration,
    registry: Arc<DashMap<String, mpsc::Sender<RoomCommand>>>,
}

impl Room {
    pub(crate) fn new(
        id: String,
        command_rx: mpsc::Receiver<RoomCommand>,
        grace: Duration,
        registry: Arc<DashMap<String, mpsc::Sender<RoomCommand>>>,
    ) -> Self {
        Self {
            id,
            participants: HashMap::new(),
            command_rx,
            grace,
            registry,
        }
    }

    pub async fn run(mut self) {
        info!(room = %self.id, "room event loop started");

        loop {
            if self.participants.is_empty() {
                match timeout(self.grace, self.command_rx.recv()).await {
                    Ok(Some(cmd)) => self.handle_command(cmd),
                    Ok(None) => break,
                    Err(_) => {
                        if !self.on_grace_expired().await {
                            break;
                        }
                    }
                }
            } else {
                match self.command_rx.recv().await {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                }
            }
        }

        info!(room = %self.id, "room event loop finished");
    }

    /// The grace period ran out with nobody in the room. Unregister first,
    /// then drain the command channel: a join whose send already succeeded
    /// must be honored, since the handler will not retry it. Returns false
    /// once the room is done for good.
    async fn on_grace_expired(&mut self) -> bool {
        let removed = self.registry.remove(&self.id);

        let mut backlog = Vec::new();
        while let Ok(cmd) = self.command_rx.try_recv() {
            backlog.push(cmd);
        }

        if backlog.is_empty() {
            debug!(room = %self.id, "empty room reaped");
            return false;
        }

        let Some((id, tx)) = removed else {
            for cmd in backlog {
                self.handle_command(cmd);
            }
            return true;
        };

        // Commands raced in, so the room stays alive. Re-register unless a
        // successor claimed the id between the remove above and now; in
        // that case the successor owns the id and gets the backlog.
        let successor = match self.registry.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(tx);
                None
            }
            Entry::Occupied(slot) => Some(slot.get().clone()),
        };

        match successor {
            None => {
                for cmd in backlog {
                    self.handle_command(cmd);
                }
                true
            }
            Some(successor) => {
                warn!(room = %self.id, "handing raced commands to successor room");
                for cmd in backlog {
                    let _ = successor.send(cmd).await;
                }
                false
            }
        }
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { participant_id, tx } => {
                info!(room = %self.id, participant = %participant_id, "participant joined");
                self.participants.insert(participant_id, tx);
            }

            RoomCommand::Relay { sender_id, frame } => {
                self.relay(sender_id, frame);
            }

            RoomCommand::Leave { participant_id } => {
                if self.participants.remove(&participant_id).is_some() {
                    info!(room = %self.id, participant = %participant_id, "participant left");
                }
            }
        }
    }

    /// Forward `frame` to every participant except the sender. Delivery is
    /// best-effort: a participant whose writer is gone is dropped here.
    fn relay(&mut self, sender_id: ParticipantId, frame: Message) {
        let mut dead = Vec::new();

        for (id, tx) in &self.participants {
            if *id == sender_id {
                continue;
            }
            if tx.send(frame.clone()).is_err() {
                dead.push(*id);
            }
        }

        for id in dead {
            warn!(room = %self.id, participant = %id, "dropping participant with closed writer");
            self.participants.remove(&id);
        }
    }

    #[cfg(test)]
    pub(crate) fn participant_count(&self) -> usize {
        self.participants.len()
    }
}
