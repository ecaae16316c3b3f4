use crate::media::{LocalMedia, LocalTrack, RemoteTrack, TrackKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Mute/unmute without renegotiation. The desired flags live here,
/// independent of any call: toggling works before a call starts, and the
/// remembered state is applied to tracks as they are attached. No toggle
/// ever emits a signaling envelope or moves the negotiation state machine.
#[derive(Clone)]
pub struct MediaControl {
    audio_enabled: Arc<AtomicBool>,
    video_enabled: Arc<AtomicBool>,
    tracks: Arc<Mutex<Vec<LocalTrack>>>,
    remote: Arc<Mutex<Vec<RemoteTrack>>>,
}

impl MediaControl {
    pub fn new() -> Self {
        Self {
            audio_enabled: Arc::new(AtomicBool::new(true)),
            video_enabled: Arc::new(AtomicBool::new(true)),
            tracks: Arc::new(Mutex::new(Vec::new())),
            remote: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Flip the audio flag on every attached audio track. Returns the new
    /// enabled state.
    pub fn toggle_audio(&self) -> bool {
        let enabled = !self.audio_enabled.fetch_xor(true, Ordering::AcqRel);
        self.apply(TrackKind::Audio, enabled);
        enabled
    }

    /// Flip the video flag on every attached video track. Returns the new
    /// enabled state.
    pub fn toggle_video(&self) -> bool {
        let enabled = !self.video_enabled.fetch_xor(true, Ordering::AcqRel);
        self.apply(TrackKind::Video, enabled);
        enabled
    }

    pub fn is_audio_enabled(&self) -> bool {
        self.audio_enabled.load(Ordering::Acquire)
    }

    pub fn is_video_enabled(&self) -> bool {
        self.video_enabled.load(Ordering::Acquire)
    }

    /// Register freshly acquired tracks, applying the remembered flags.
    pub fn attach(&self, media: &LocalMedia) {
        if let Ok(mut tracks) = self.tracks.lock() {
            for track in &media.tracks {
                let enabled = match track.kind() {
                    TrackKind::Audio => self.is_audio_enabled(),
                    TrackKind::Video => self.is_video_enabled(),
                };
                track.set_enabled(enabled);
                tracks.push(track.clone());
            }
        }
    }

    /// Record a track the peer engine delivered from the remote side.
    pub fn add_remote(&self, track: RemoteTrack) {
        if let Ok(mut remote) = self.remote.lock() {
            remote.push(track);
        }
    }

    /// Tracks received from the peer so far, in arrival order.
    pub fn remote_tracks(&self) -> Vec<RemoteTrack> {
        self.remote
            .lock()
            .map(|remote| remote.clone())
            .unwrap_or_default()
    }

    /// Drop all attached tracks, local and remote; part of call teardown.
    pub fn detach(&self) {
        if let Ok(mut tracks) = self.tracks.lock() {
            tracks.clear();
        }
        if let Ok(mut remote) = self.remote.lock() {
            remote.clear();
        }
    }

    fn apply(&self, kind: TrackKind, enabled: bool) {
        if let Ok(tracks) = self.tracks.lock() {
            for track in tracks.iter().filter(|t| t.kind() == kind) {
                track.set_enabled(enabled);
            }
        }
    }
}

impl Default for MediaControl {
    fn default() -> Self {
        Self::new()
    }
}
