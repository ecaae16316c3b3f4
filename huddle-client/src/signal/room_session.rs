use crate::error::SignalError;
use crate::signal::SignalingSink;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use huddle_core::SignalEnvelope;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, warn};

/// One participant connection to a room, scoped to that room for its whole
/// lifetime. Envelopes go out through a single writer task, so a peer sees
/// them in send order; inbound envelopes arrive on the receiver returned by
/// [`RoomSession::connect`], which yields `None` once the transport closes
/// for any reason.
pub struct RoomSession {
    outbound: mpsc::UnboundedSender<Message>,
    closed: AtomicBool,
}

impl RoomSession {
    pub(crate) async fn connect(
        ws_url: &str,
    ) -> Result<(Self, mpsc::Receiver<SignalEnvelope>), SignalError> {
        let (socket, _response) = connect_async(ws_url).await?;
        debug!(url = %ws_url, "room session opened");

        let (mut ws_tx, mut ws_rx) = socket.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
        let (in_tx, in_rx) = mpsc::channel(64);

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if ws_tx.send(msg).await.is_err() {
                    break;
                }
                if closing {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            while let Some(Ok(msg)) = ws_rx.next().await {
                match msg {
                    Message::Text(text) => {
                        match serde_json::from_str::<SignalEnvelope>(text.as_str()) {
                            Ok(envelope) => {
                                if in_tx.send(envelope).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!(error = %e, "ignoring unparseable signaling frame"),
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            // Dropping `in_tx` ends the inbound stream; the session reads
            // that as transport closure, clean or abnormal alike.
        });

        Ok((
            Self {
                outbound: out_tx,
                closed: AtomicBool::new(false),
            },
            in_rx,
        ))
    }
}

#[async_trait]
impl SignalingSink for RoomSession {
    async fn send(&self, envelope: SignalEnvelope) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }

        match serde_json::to_string(&envelope) {
            Ok(json) => {
                let _ = self.outbound.send(Message::Text(json.into()));
            }
            Err(e) => error!(error = %e, "failed to serialize envelope"),
        }
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.outbound.send(Message::Close(None));
    }
}
