use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// One local capture track plus its enabled flag. Disabling never detaches
/// the track or touches negotiation: the capture pipeline checks
/// [`LocalTrack::is_enabled`] before pushing samples, so a muted track
/// simply goes silent.
#[derive(Clone)]
pub struct LocalTrack {
    kind: TrackKind,
    enabled: Arc<AtomicBool>,
    rtc: Option<Arc<dyn TrackLocal + Send + Sync>>,
}

impl LocalTrack {
    /// A track without an engine handle; used by tests and headless setups.
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            enabled: Arc::new(AtomicBool::new(true)),
            rtc: None,
        }
    }

    pub fn with_rtc(kind: TrackKind, rtc: Arc<dyn TrackLocal + Send + Sync>) -> Self {
        Self {
            kind,
            enabled: Arc::new(AtomicBool::new(true)),
            rtc: Some(rtc),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub(crate) fn rtc(&self) -> Option<Arc<dyn TrackLocal + Send + Sync>> {
        self.rtc.clone()
    }
}

/// The set of local capture tracks for one call attempt.
#[derive(Clone, Default)]
pub struct LocalMedia {
    pub tracks: Vec<LocalTrack>,
}

/// A peer's track as delivered by the engine. What to do with the samples
/// (render, record, drop) is the application's concern.
#[derive(Clone)]
pub struct RemoteTrack {
    kind: TrackKind,
    rtc: Option<Arc<TrackRemote>>,
}

impl RemoteTrack {
    /// A track without an engine handle; used by tests and headless setups.
    pub fn new(kind: TrackKind) -> Self {
        Self { kind, rtc: None }
    }

    pub fn with_rtc(kind: TrackKind, rtc: Arc<TrackRemote>) -> Self {
        Self {
            kind,
            rtc: Some(rtc),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn rtc(&self) -> Option<Arc<TrackRemote>> {
        self.rtc.clone()
    }
}

impl fmt::Debug for RemoteTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTrack").field("kind", &self.kind).finish()
    }
}
