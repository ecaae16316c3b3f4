mod session;
mod state;

pub use session::*;
pub use state::*;

use crate::engine::RtcEngineFactory;
use crate::error::CallError;
use crate::media::{MediaControl, MediaSource};
use crate::signal::RelayClient;
use huddle_core::RoomId;
use std::sync::Arc;

/// Knobs for one call attempt.
#[derive(Debug, Clone)]
pub struct CallConfig {
    /// STUN/TURN urls handed to the peer engine; empty works on a LAN.
    pub ice_servers: Vec<String>,
    pub audio: bool,
    pub video: bool,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![],
            audio: true,
            video: true,
        }
    }
}

/// Run the pre-call sequence: acquire local media, open the room session,
/// build the peer engine, spawn the negotiation loop.
///
/// Capture failure surfaces as [`CallError::MediaUnavailable`] and relay
/// connection failure as [`CallError::RelayUnreachable`], both before any
/// call state exists. Everything after that is reported through the
/// returned handle's event stream.
pub async fn connect(
    relay: &RelayClient,
    room: &RoomId,
    source: &dyn MediaSource,
    config: CallConfig,
) -> Result<CallHandle, CallError> {
    let media = source.acquire(config.video, config.audio).await?;

    let (room_session, signal_rx) = relay.open(room).await?;

    let control = MediaControl::new();
    control.attach(&media);

    let factory = Arc::new(RtcEngineFactory::new(config.ice_servers, media));
    CallSession::spawn(factory, Arc::new(room_session), control, signal_rx).await
}
