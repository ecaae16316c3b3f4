use thiserror::Error;

/// Failures of the relay transport itself.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("relay HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("relay websocket failed")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("relay returned a malformed response")]
    MalformedResponse,
}

/// The call-level error taxonomy. None of these are retried automatically:
/// pre-call failures surface to the caller, in-call failures end the call.
#[derive(Debug, Error)]
pub enum CallError {
    /// Capture devices denied or absent.
    #[error("local media unavailable: {0}")]
    MediaUnavailable(String),

    /// The signaling transport could not be opened or dropped unexpectedly.
    #[error("signaling relay unreachable")]
    RelayUnreachable(#[from] SignalError),

    /// The peer engine rejected a description or candidate exchange step.
    #[error("negotiation failed: {0}")]
    NegotiationFailed(String),

    /// The peer transport reported failed/disconnected ICE state.
    #[error("peer transport failed")]
    TransportFailed,
}
