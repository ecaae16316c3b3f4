#![allow(dead_code)]

use async_trait::async_trait;
use huddle_client::engine::{EngineEvent, EngineFactory, PeerEngine};
use huddle_client::error::CallError;
use huddle_client::signal::SignalingSink;
use huddle_client::{CallEvent, CallHandle, CallSession, MediaControl};
use huddle_core::{IceCandidate, SessionDescription, SignalEnvelope};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Everything a mock engine was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOp {
    CreateOffer,
    CreateAnswer,
    SetLocal(SessionDescription),
    SetRemote(SessionDescription),
    AddCandidate(IceCandidate),
    Close,
}

/// Scriptable [`PeerEngine`] that records every operation.
pub struct MockEngine {
    sdp: String,
    fail_remote: bool,
    ops: Arc<Mutex<Vec<EngineOp>>>,
}

impl MockEngine {
    pub fn new(sdp: impl Into<String>) -> Self {
        Self {
            sdp: sdp.into(),
            fail_remote: false,
            ops: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Engine that rejects every remote description.
    pub fn rejecting_remote(sdp: impl Into<String>) -> Self {
        Self {
            fail_remote: true,
            ..Self::new(sdp)
        }
    }

    pub async fn ops(&self) -> Vec<EngineOp> {
        self.ops.lock().await.clone()
    }

    pub async fn candidates_applied(&self) -> Vec<IceCandidate> {
        self.ops
            .lock()
            .await
            .iter()
            .filter_map(|op| match op {
                EngineOp::AddCandidate(c) => Some(c.clone()),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, op: EngineOp) {
        self.ops.lock().await.push(op);
    }
}

#[async_trait]
impl PeerEngine for MockEngine {
    async fn create_offer(&self) -> Result<SessionDescription, CallError> {
        self.record(EngineOp::CreateOffer).await;
        Ok(SessionDescription::offer(self.sdp.clone()))
    }

    async fn create_answer(&self) -> Result<SessionDescription, CallError> {
        self.record(EngineOp::CreateAnswer).await;
        Ok(SessionDescription::answer(format!("answer-{}", self.sdp)))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), CallError> {
        self.record(EngineOp::SetLocal(desc)).await;
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), CallError> {
        self.record(EngineOp::SetRemote(desc)).await;
        if self.fail_remote {
            return Err(CallError::NegotiationFailed("rejected".into()));
        }
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), CallError> {
        self.record(EngineOp::AddCandidate(candidate)).await;
        Ok(())
    }

    async fn close(&self) {
        self.record(EngineOp::Close).await;
    }
}

/// Factory that keeps every engine it built, plus the event senders the
/// session handed over, so tests can inspect engines and inject events.
pub struct MockEngineFactory {
    sdp: String,
    fail_remote: bool,
    created: Arc<Mutex<Vec<Arc<MockEngine>>>>,
    event_txs: Arc<Mutex<Vec<mpsc::Sender<EngineEvent>>>>,
}

impl MockEngineFactory {
    pub fn new(sdp: impl Into<String>) -> Arc<Self> {
        Self::build(sdp.into(), false)
    }

    /// Factory whose engines reject every remote description.
    pub fn rejecting_remote(sdp: impl Into<String>) -> Arc<Self> {
        Self::build(sdp.into(), true)
    }

    fn build(sdp: String, fail_remote: bool) -> Arc<Self> {
        Arc::new(Self {
            sdp,
            fail_remote,
            created: Arc::new(Mutex::new(Vec::new())),
            event_txs: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub async fn engine_count(&self) -> usize {
        self.created.lock().await.len()
    }

    pub async fn engine(&self, index: usize) -> Arc<MockEngine> {
        Arc::clone(&self.created.lock().await[index])
    }

    /// Inject an engine event as if engine `index` produced it.
    pub async fn emit(&self, index: usize, event: EngineEvent) {
        let tx = self.event_txs.lock().await[index].clone();
        tx.send(event).await.expect("session gone");
    }
}

#[async_trait]
impl EngineFactory for MockEngineFactory {
    async fn create(
        &self,
        events: mpsc::Sender<EngineEvent>,
    ) -> Result<Arc<dyn PeerEngine>, CallError> {
        let engine = Arc::new(if self.fail_remote {
            MockEngine::rejecting_remote(self.sdp.clone())
        } else {
            MockEngine::new(self.sdp.clone())
        });
        self.created.lock().await.push(Arc::clone(&engine));
        self.event_txs.lock().await.push(events);
        Ok(engine)
    }
}

/// Mock [`SignalingSink`] that captures outbound envelopes and optionally
/// forwards them into another session's inbound stream.
pub struct MockSignalingSink {
    tx: mpsc::UnboundedSender<SignalEnvelope>,
    forward: Option<mpsc::Sender<SignalEnvelope>>,
    closed: Arc<AtomicBool>,
}

impl MockSignalingSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SignalEnvelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                forward: None,
                closed: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }

    /// Cross-wired variant: everything sent here also lands on `forward`,
    /// emulating the relay between two sessions.
    pub fn forwarding(
        forward: mpsc::Sender<SignalEnvelope>,
    ) -> (Self, mpsc::UnboundedReceiver<SignalEnvelope>) {
        let (mut sink, rx) = Self::new();
        sink.forward = Some(forward);
        (sink, rx)
    }

    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

#[async_trait]
impl SignalingSink for MockSignalingSink {
    async fn send(&self, envelope: SignalEnvelope) {
        let _ = self.tx.send(envelope.clone());
        if let Some(forward) = &self.forward {
            let _ = forward.send(envelope).await;
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// One spawned session plus every knob a test needs to poke it.
pub struct TestSession {
    pub handle: CallHandle,
    pub factory: Arc<MockEngineFactory>,
    /// Envelopes the session sent.
    pub outbound: mpsc::UnboundedReceiver<SignalEnvelope>,
    /// Inject inbound envelopes, as if relayed from the peer.
    pub inbound: mpsc::Sender<SignalEnvelope>,
    pub sink_closed: Arc<AtomicBool>,
}

pub async fn spawn_session(sdp: &str) -> TestSession {
    spawn_session_with(MockEngineFactory::new(sdp)).await
}

pub async fn spawn_session_with(factory: Arc<MockEngineFactory>) -> TestSession {
    let (sink, outbound) = MockSignalingSink::new();
    let sink_closed = sink.closed_flag();
    let (inbound, signal_rx) = mpsc::channel(64);

    let handle = CallSession::spawn(
        Arc::clone(&factory) as Arc<dyn EngineFactory>,
        Arc::new(sink),
        MediaControl::new(),
        signal_rx,
    )
    .await
    .expect("failed to spawn session");

    TestSession {
        handle,
        factory,
        outbound,
        inbound,
        sink_closed,
    }
}

/// Two sessions wired back to back through their mock sinks.
pub async fn spawn_session_pair(sdp_a: &str, sdp_b: &str) -> (TestSession, TestSession) {
    let (a_inbound, a_signal_rx) = mpsc::channel(64);
    let (b_inbound, b_signal_rx) = mpsc::channel(64);

    let factory_a = MockEngineFactory::new(sdp_a);
    let factory_b = MockEngineFactory::new(sdp_b);

    let (sink_a, outbound_a) = MockSignalingSink::forwarding(b_inbound.clone());
    let (sink_b, outbound_b) = MockSignalingSink::forwarding(a_inbound.clone());
    let a_closed = sink_a.closed_flag();
    let b_closed = sink_b.closed_flag();

    let handle_a = CallSession::spawn(
        Arc::clone(&factory_a) as Arc<dyn EngineFactory>,
        Arc::new(sink_a),
        MediaControl::new(),
        a_signal_rx,
    )
    .await
    .expect("failed to spawn session a");

    let handle_b = CallSession::spawn(
        Arc::clone(&factory_b) as Arc<dyn EngineFactory>,
        Arc::new(sink_b),
        MediaControl::new(),
        b_signal_rx,
    )
    .await
    .expect("failed to spawn session b");

    (
        TestSession {
            handle: handle_a,
            factory: factory_a,
            outbound: outbound_a,
            inbound: a_inbound,
            sink_closed: a_closed,
        },
        TestSession {
            handle: handle_b,
            factory: factory_b,
            outbound: outbound_b,
            inbound: b_inbound,
            sink_closed: b_closed,
        },
    )
}

pub async fn next_call_event(handle: &mut CallHandle, timeout_ms: u64) -> Option<CallEvent> {
    tokio::time::timeout(Duration::from_millis(timeout_ms), handle.next_event())
        .await
        .ok()
        .flatten()
}

pub async fn next_envelope(
    rx: &mut mpsc::UnboundedReceiver<SignalEnvelope>,
    timeout_ms: u64,
) -> Option<SignalEnvelope> {
    tokio::time::timeout(Duration::from_millis(timeout_ms), rx.recv())
        .await
        .ok()
        .flatten()
}
