pub mod model;

pub use model::{
    IceCandidate, ParticipantId, RoomId, SdpKind, SessionDescription, SignalEnvelope,
};
