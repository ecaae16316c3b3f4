use crate::error::SignalError;
use crate::signal::RoomSession;
use huddle_core::{RoomId, SignalEnvelope};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Deserialize)]
struct CreateRoomResponse {
    #[serde(rename = "roomID")]
    room_id: String,
}

/// Client-side view of the relay: room allocation over HTTP, participant
/// connections over WebSocket.
pub struct RelayClient {
    base_url: String,
    http: reqwest::Client,
}

impl RelayClient {
    /// `base_url` is the relay's HTTP origin, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Allocate a fresh room id. The relay registers nothing until the
    /// first join, so this is a pure allocation.
    pub async fn create_room(&self) -> Result<RoomId, SignalError> {
        let response = self
            .http
            .get(format!("{}/create-room", self.base_url))
            .send()
            .await?
            .error_for_status()?;

        let body: CreateRoomResponse = response.json().await?;
        if body.room_id.is_empty() {
            return Err(SignalError::MalformedResponse);
        }

        info!(room = %body.room_id, "room allocated");
        Ok(RoomId::from(body.room_id))
    }

    /// Open a participant connection to `room`. Returns the session handle
    /// and the inbound envelope stream.
    pub async fn open(
        &self,
        room: &RoomId,
    ) -> Result<(RoomSession, mpsc::Receiver<SignalEnvelope>), SignalError> {
        RoomSession::connect(&format!("{}/ws/{}", self.ws_base(), room)).await
    }

    fn ws_base(&self) -> String {
        if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        }
    }
}
