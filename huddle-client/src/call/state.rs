/// Which side of the offer/answer exchange this session took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectingKind {
    OfferSent,
    OfferReceived,
}

/// Negotiation progress of one call attempt. `Ended` is terminal and every
/// state may fall back to it on unrecoverable failure.
///
/// The idle phase of a call lives outside the session: `connect` acquires
/// local media before a session exists, so a capture failure means no
/// session is ever spawned and every session is born in `MediaReady`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    MediaReady,
    Connecting(ConnectingKind),
    Connected,
    Ended,
}

/// Why the call ended. Exposed through the single terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    LocalHangup,
    RemoteHangup,
    TransportFailed,
    RelayClosed,
    NegotiationFailed,
}
