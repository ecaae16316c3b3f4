use crate::engine::{EngineEvent, EngineFactory, PeerEngine, TransportState};
use crate::error::CallError;
use crate::media::{LocalMedia, RemoteTrack, TrackKind};
use async_trait::async_trait;
use huddle_core::{IceCandidate, SdpKind, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;

fn negotiation(e: webrtc::Error) -> CallError {
    CallError::NegotiationFailed(e.to_string())
}

fn map_state(state: RTCPeerConnectionState) -> TransportState {
    match state {
        RTCPeerConnectionState::Connecting => TransportState::Connecting,
        RTCPeerConnectionState::Connected => TransportState::Connected,
        RTCPeerConnectionState::Disconnected => TransportState::Disconnected,
        RTCPeerConnectionState::Failed => TransportState::Failed,
        RTCPeerConnectionState::Closed => TransportState::Closed,
        _ => TransportState::New,
    }
}

fn to_rtc_description(desc: SessionDescription) -> Result<RTCSessionDescription, CallError> {
    match desc.kind {
        SdpKind::Offer => RTCSessionDescription::offer(desc.sdp).map_err(negotiation),
        SdpKind::Answer => RTCSessionDescription::answer(desc.sdp).map_err(negotiation),
    }
}

/// Production [`PeerEngine`] over webrtc-rs. Local tracks are attached at
/// construction; candidate discovery and connection-state changes are
/// forwarded to the session's event channel.
pub struct RtcEngine {
    pc: Arc<RTCPeerConnection>,
}

impl RtcEngine {
    pub async fn new(
        ice_servers: Vec<String>,
        media: &LocalMedia,
        events: mpsc::Sender<EngineEvent>,
    ) -> Result<Self, CallError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs().map_err(negotiation)?;

        let registry =
            register_default_interceptors(Registry::new(), &mut media_engine).map_err(negotiation)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: if ice_servers.is_empty() {
                vec![]
            } else {
                vec![RTCIceServer {
                    urls: ice_servers,
                    ..Default::default()
                }]
            },
            ..Default::default()
        };

        let pc = Arc::new(api.new_peer_connection(rtc_config).await.map_err(negotiation)?);

        let state_events = events.clone();
        pc.on_peer_connection_state_change(Box::new(move |state| {
            let events = state_events.clone();
            Box::pin(async move {
                debug!(?state, "peer connection state changed");
                let _ = events
                    .send(EngineEvent::TransportState(map_state(state)))
                    .await;
            })
        }));

        let track_events = events.clone();
        pc.on_track(Box::new(move |track, _receiver, _transceiver| {
            let events = track_events.clone();
            Box::pin(async move {
                let kind = match track.kind() {
                    RTPCodecType::Audio => TrackKind::Audio,
                    RTPCodecType::Video => TrackKind::Video,
                    _ => return,
                };
                debug!(?kind, "remote track arrived");
                let _ = events
                    .send(EngineEvent::RemoteTrack(RemoteTrack::with_rtc(kind, track)))
                    .await;
            })
        }));

        pc.on_ice_candidate(Box::new(move |candidate| {
            let events = events.clone();
            Box::pin(async move {
                let Some(c) = candidate else { return };
                match c.to_json() {
                    Ok(init) => {
                        let _ = events
                            .send(EngineEvent::LocalCandidate(IceCandidate {
                                candidate: init.candidate,
                                sdp_mid: init.sdp_mid,
                                sdp_mline_index: init.sdp_mline_index,
                                username_fragment: init.username_fragment,
                            }))
                            .await;
                    }
                    Err(e) => warn!(error = %e, "failed to serialize local candidate"),
                }
            })
        }));

        for track in &media.tracks {
            if let Some(rtc) = track.rtc() {
                pc.add_track(rtc).await.map_err(negotiation)?;
            }
        }

        Ok(Self { pc })
    }
}

#[async_trait]
impl PeerEngine for RtcEngine {
    async fn create_offer(&self) -> Result<SessionDescription, CallError> {
        let offer = self.pc.create_offer(None).await.map_err(negotiation)?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, CallError> {
        let answer = self.pc.create_answer(None).await.map_err(negotiation)?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), CallError> {
        self.pc
            .set_local_description(to_rtc_description(desc)?)
            .await
            .map_err(negotiation)
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), CallError> {
        self.pc
            .set_remote_description(to_rtc_description(desc)?)
            .await
            .map_err(negotiation)
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), CallError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_mline_index,
            username_fragment: candidate.username_fragment,
        };
        self.pc.add_ice_candidate(init).await.map_err(negotiation)
    }

    async fn close(&self) {
        if let Err(e) = self.pc.close().await {
            warn!(error = %e, "failed to close peer connection");
        }
    }
}

/// Factory for [`RtcEngine`] instances sharing one ICE configuration and
/// one set of local capture tracks.
pub struct RtcEngineFactory {
    ice_servers: Vec<String>,
    media: LocalMedia,
}

impl RtcEngineFactory {
    pub fn new(ice_servers: Vec<String>, media: LocalMedia) -> Self {
        Self { ice_servers, media }
    }
}

#[async_trait]
impl EngineFactory for RtcEngineFactory {
    async fn create(
        &self,
        events: mpsc::Sender<EngineEvent>,
    ) -> Result<Arc<dyn PeerEngine>, CallError> {
        let engine = RtcEngine::new(self.ice_servers.clone(), &self.media, events).await?;
        Ok(Arc::new(engine))
    }
}
