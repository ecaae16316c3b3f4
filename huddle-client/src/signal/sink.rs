use async_trait::async_trait;
use huddle_core::SignalEnvelope;

/// Outbound half of a signaling connection, as seen by a call session.
/// `RoomSession` is the production implementation; tests substitute mocks.
#[async_trait]
pub trait SignalingSink: Send + Sync {
    /// Queue an envelope for the peer. Best-effort: the relay acknowledges
    /// nothing, and a lost peer only ever shows up as transport closure.
    async fn send(&self, envelope: SignalEnvelope);

    /// Close the signaling transport. Idempotent, safe to call from a
    /// teardown path that is already mid-close.
    async fn close(&self);
}
