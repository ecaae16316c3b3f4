pub mod call;
pub mod engine;
pub mod error;
pub mod media;
pub mod signal;

pub use call::{
    CallConfig, CallEvent, CallHandle, CallSession, CallState, ConnectingKind, EndReason, connect,
};
pub use error::{CallError, SignalError};
pub use media::{
    LocalMedia, LocalTrack, MediaControl, MediaSource, RemoteTrack, StaticMediaSource, TrackKind,
};
pub use signal::{RelayClient, RoomSession, SignalingSink};
