use crate::config::ServerConfig;
use crate::room::{Room, RoomCommand};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Registry of live rooms. Resolution is get-or-create: joining an id the
/// relay has never seen creates the room on the spot. Rooms unregister
/// themselves once they have sat empty past the grace period.
#[derive(Clone)]
pub struct RoomManager {
    rooms: Arc<DashMap<String, mpsc::Sender<RoomCommand>>>,
    grace: Duration,
    max_rooms: usize,
}

impl RoomManager {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            grace: config.room_grace,
            max_rooms: config.max_rooms,
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn at_capacity(&self) -> bool {
        self.rooms.len() >= self.max_rooms
    }

    /// Resolve the command channel for `room_id`, spawning the room if it
    /// does not exist yet. `None` means the live-room cap was hit.
    pub fn room_sender(&self, room_id: &str) -> Option<mpsc::Sender<RoomCommand>> {
        if let Some(sender) = self.rooms.get(room_id) {
            return Some(sender.clone());
        }

        if self.at_capacity() {
            warn!(room = %room_id, max_rooms = self.max_rooms, "room capacity reached");
            return None;
        }

        let sender = self
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                info!(room = %room_id, "creating room");
                let (tx, rx) = mpsc::channel(100);
                let room = Room::new(room_id.to_string(), rx, self.grace, Arc::clone(&self.rooms));
                tokio::spawn(room.run());
                tx
            })
            .clone();

        Some(sender)
    }
}
