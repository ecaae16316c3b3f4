mod rtc;

pub use rtc::*;

use crate::error::CallError;
use crate::media::RemoteTrack;
use async_trait::async_trait;
use huddle_core::{IceCandidate, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Connection state of the underlying peer transport, observed
/// asynchronously from the engine's own ICE machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Events the engine pushes at the negotiation loop.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A local candidate was discovered and should be trickled to the peer.
    LocalCandidate(IceCandidate),
    /// The peer's media started arriving on a new inbound track.
    RemoteTrack(RemoteTrack),
    TransportState(TransportState),
}

/// Capability contract over a standards-compliant peer-connection engine.
/// The negotiation state machine only ever talks to this seam; the
/// production implementation is [`RtcEngine`].
#[async_trait]
pub trait PeerEngine: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, CallError>;

    async fn create_answer(&self) -> Result<SessionDescription, CallError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), CallError>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), CallError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), CallError>;

    async fn close(&self);
}

/// Builds fresh engine instances. A call session never reuses an engine:
/// the factory runs once at session start and again when an offer-glare
/// loser restarts negotiation.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn create(
        &self,
        events: mpsc::Sender<EngineEvent>,
    ) -> Result<Arc<dyn PeerEngine>, CallError>;
}
