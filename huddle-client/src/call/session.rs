use crate::call::{CallState, ConnectingKind, EndReason};
use crate::engine::{EngineEvent, EngineFactory, PeerEngine, TransportState};
use crate::error::CallError;
use crate::media::MediaControl;
use crate::signal::SignalingSink;
use huddle_core::{IceCandidate, SessionDescription, SignalEnvelope};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub enum CallCommand {
    Start,
    End,
}

/// What the caller observes: at most one `Connected` followed by exactly
/// one `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    Connected,
    Ended(EndReason),
}

/// Caller-side handle to a running call session.
pub struct CallHandle {
    commands: mpsc::UnboundedSender<CallCommand>,
    events: mpsc::UnboundedReceiver<CallEvent>,
    media: MediaControl,
}

impl std::fmt::Debug for CallHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallHandle").finish_non_exhaustive()
    }
}

impl CallHandle {
    /// Kick off the offer exchange. A no-op while already connecting or
    /// connected.
    pub fn start_call(&self) {
        let _ = self.commands.send(CallCommand::Start);
    }

    /// Hang up. The peer is told via a `Disconnect` envelope before local
    /// resources are released.
    pub fn end_call(&self) {
        let _ = self.commands.send(CallCommand::End);
    }

    pub async fn next_event(&mut self) -> Option<CallEvent> {
        self.events.recv().await
    }

    pub fn media(&self) -> &MediaControl {
        &self.media
    }
}

/// The negotiation state machine for one call attempt. Owns the peer
/// engine and the signaling connection exclusively; both are released on
/// the single teardown path.
pub struct CallSession {
    state: CallState,
    engine: Arc<dyn PeerEngine>,
    factory: Arc<dyn EngineFactory>,
    engine_tx: mpsc::Sender<EngineEvent>,
    signaling: Arc<dyn SignalingSink>,
    media: MediaControl,
    local_offer: Option<SessionDescription>,
    offer_nonce: Uuid,
    pending_candidates: Vec<IceCandidate>,
    remote_description_set: bool,
    events: mpsc::UnboundedSender<CallEvent>,
}

impl CallSession {
    /// Build a session and spawn its event loop. The caller must already
    /// hold acquired local media; the session starts in `MediaReady`.
    pub async fn spawn(
        factory: Arc<dyn EngineFactory>,
        signaling: Arc<dyn SignalingSink>,
        media: MediaControl,
        signal_rx: mpsc::Receiver<SignalEnvelope>,
    ) -> Result<CallHandle, CallError> {
        let (engine_tx, engine_rx) = mpsc::channel(64);
        let engine = factory.create(engine_tx.clone()).await?;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let session = Self {
            state: CallState::MediaReady,
            engine,
            factory,
            engine_tx,
            signaling,
            media: media.clone(),
            local_offer: None,
            offer_nonce: Uuid::new_v4(),
            pending_candidates: Vec::new(),
            remote_description_set: false,
            events: event_tx,
        };

        tokio::spawn(session.run(cmd_rx, signal_rx, engine_rx));

        Ok(CallHandle {
            commands: cmd_tx,
            events: event_rx,
            media,
        })
    }

    async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<CallCommand>,
        mut signal_rx: mpsc::Receiver<SignalEnvelope>,
        mut engine_rx: mpsc::Receiver<EngineEvent>,
    ) {
        info!("call session started");

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(CallCommand::Start) => self.on_start().await,
                    // A dropped handle hangs up the same way End does.
                    Some(CallCommand::End) | None => {
                        self.finish(EndReason::LocalHangup, true).await;
                    }
                },

                envelope = signal_rx.recv() => match envelope {
                    Some(envelope) => self.on_envelope(envelope).await,
                    None => self.finish(EndReason::RelayClosed, false).await,
                },

                event = engine_rx.recv() => {
                    if let Some(event) = event {
                        self.on_engine_event(event).await;
                    }
                }
            }

            if self.state == CallState::Ended {
                break;
            }
        }

        debug!("call session finished");
    }

    async fn on_start(&mut self) {
        if self.state != CallState::MediaReady {
            // At most one offer per call attempt; repeats are no-ops.
            debug!(state = ?self.state, "start_call ignored");
            return;
        }

        match self.send_offer().await {
            Ok(()) => self.state = CallState::Connecting(ConnectingKind::OfferSent),
            Err(e) => {
                error!(error = %e, "failed to start call");
                self.finish(EndReason::NegotiationFailed, false).await;
            }
        }
    }

    async fn send_offer(&mut self) -> Result<(), CallError> {
        let offer = self.engine.create_offer().await?;
        self.engine.set_local_description(offer.clone()).await?;

        // The nonce exists only on the wire; the engine never sees it.
        let mut wire = offer.clone();
        wire.nonce = Some(self.offer_nonce);
        self.signaling.send(SignalEnvelope::Offer(wire)).await;

        self.local_offer = Some(offer);
        Ok(())
    }

    async fn on_envelope(&mut self, envelope: SignalEnvelope) {
        if self.state == CallState::Ended {
            return;
        }

        match envelope {
            SignalEnvelope::Offer(offer) => self.on_remote_offer(offer).await,
            SignalEnvelope::Answer(answer) => self.on_remote_answer(answer).await,
            SignalEnvelope::Candidate(candidate) => self.on_remote_candidate(candidate).await,
            SignalEnvelope::Disconnect(_) => self.finish(EndReason::RemoteHangup, false).await,
        }
    }

    async fn on_remote_offer(&mut self, offer: SessionDescription) {
        match self.state {
            CallState::MediaReady => {
                if let Err(e) = self.answer(offer).await {
                    error!(error = %e, "failed to answer remote offer");
                    self.finish(EndReason::NegotiationFailed, false).await;
                }
            }

            CallState::Connecting(ConnectingKind::OfferSent) if !self.remote_description_set => {
                // Offer glare: both sides offered inside the same window.
                // The lexicographically smaller SDP stays offerer, with the
                // wire nonce as a total tie-break for identical SDPs. Both
                // sides see both keys, so they agree on the winner. (A peer
                // that sends no nonce compares smaller and wins ties.)
                let ours = self
                    .local_offer
                    .as_ref()
                    .map(|o| o.sdp.as_str())
                    .unwrap_or_default();

                if (ours, Some(self.offer_nonce)) <= (offer.sdp.as_str(), offer.nonce) {
                    debug!("offer glare: holding local offer");
                    return;
                }

                debug!("offer glare: yielding to remote offer");
                if let Err(e) = self.restart_as_answerer(offer).await {
                    error!(error = %e, "failed to resolve offer glare");
                    self.finish(EndReason::NegotiationFailed, false).await;
                }
            }

            _ => debug!(state = ?self.state, "ignoring unexpected offer"),
        }
    }

    /// Glare loser path: the half-negotiated engine is discarded, never
    /// reused, and a fresh instance answers the winning offer. Candidates
    /// queued so far belong to the winner's engine and stay queued.
    async fn restart_as_answerer(&mut self, offer: SessionDescription) -> Result<(), CallError> {
        self.engine.close().await;
        self.engine = self.factory.create(self.engine_tx.clone()).await?;
        self.local_offer = None;
        self.remote_description_set = false;
        self.answer(offer).await
    }

    async fn answer(&mut self, mut offer: SessionDescription) -> Result<(), CallError> {
        offer.nonce = None;
        self.apply_remote_description(offer).await?;

        let answer = self.engine.create_answer().await?;
        self.engine.set_local_description(answer.clone()).await?;
        self.signaling.send(SignalEnvelope::Answer(answer)).await;

        self.state = CallState::Connecting(ConnectingKind::OfferReceived);
        Ok(())
    }

    async fn on_remote_answer(&mut self, answer: SessionDescription) {
        if self.state != CallState::Connecting(ConnectingKind::OfferSent)
            || self.remote_description_set
        {
            debug!(state = ?self.state, "ignoring unexpected answer");
            return;
        }

        if let Err(e) = self.apply_remote_description(answer).await {
            error!(error = %e, "failed to apply remote answer");
            self.finish(EndReason::NegotiationFailed, false).await;
        }
    }

    /// Set the remote description, then flush candidates that arrived
    /// ahead of it, in receipt order.
    async fn apply_remote_description(
        &mut self,
        desc: SessionDescription,
    ) -> Result<(), CallError> {
        self.engine.set_remote_description(desc).await?;
        self.remote_description_set = true;

        for candidate in std::mem::take(&mut self.pending_candidates) {
            if let Err(e) = self.engine.add_ice_candidate(candidate).await {
                warn!(error = %e, "failed to apply queued candidate");
            }
        }

        Ok(())
    }

    async fn on_remote_candidate(&mut self, candidate: IceCandidate) {
        if !self.remote_description_set {
            // Trickle ICE can outrun the offer/answer exchange; hold the
            // candidate until a remote description exists.
            self.pending_candidates.push(candidate);
            return;
        }

        if let Err(e) = self.engine.add_ice_candidate(candidate).await {
            // Non-fatal; stale candidates minted by a discarded glare
            // engine land here.
            warn!(error = %e, "failed to apply remote candidate");
        }
    }

    async fn on_engine_event(&mut self, event: EngineEvent) {
        if self.state == CallState::Ended {
            return;
        }

        match event {
            EngineEvent::LocalCandidate(candidate) => {
                // Trickle ICE keeps emitting after Connected; forward all
                // of it.
                self.signaling
                    .send(SignalEnvelope::Candidate(candidate))
                    .await;
            }
            EngineEvent::RemoteTrack(track) => {
                debug!(kind = ?track.kind(), "remote track arrived");
                self.media.add_remote(track);
            }
            EngineEvent::TransportState(transport) => self.on_transport_state(transport).await,
        }
    }

    async fn on_transport_state(&mut self, transport: TransportState) {
        match transport {
            TransportState::Connected => {
                if matches!(self.state, CallState::Connecting(_)) {
                    info!("peer transport connected");
                    self.state = CallState::Connected;
                    let _ = self.events.send(CallEvent::Connected);
                }
            }

            TransportState::Failed | TransportState::Disconnected => {
                self.finish(EndReason::TransportFailed, false).await;
            }

            // Closed is what our own teardown produces; New/Connecting
            // are not interesting here.
            _ => {}
        }
    }

    /// The single teardown path. Duplicate triggers collapse into the
    /// first: the terminal event fires exactly once per call attempt.
    async fn finish(&mut self, reason: EndReason, notify_peer: bool) {
        if self.state == CallState::Ended {
            return;
        }

        info!(?reason, "call ended");

        if notify_peer {
            self.signaling.send(SignalEnvelope::disconnect()).await;
        }

        self.engine.close().await;
        self.media.detach();
        self.signaling.close().await;

        self.state = CallState::Ended;
        let _ = self.events.send(CallEvent::Ended(reason));
    }
}
