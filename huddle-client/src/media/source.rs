use crate::error::CallError;
use crate::media::{LocalMedia, LocalTrack, TrackKind};
use async_trait::async_trait;
use std::sync::Arc;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Capability contract over the local capture facility. Acquisition failure
/// is `MediaUnavailable` and is never retried here.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self, video: bool, audio: bool) -> Result<LocalMedia, CallError>;
}

/// Media source backed by static sample tracks. Where the samples come from
/// (camera, microphone, file) is the application's concern; this provides
/// the track objects the peer connection sends from.
#[derive(Debug, Default)]
pub struct StaticMediaSource;

#[async_trait]
impl MediaSource for StaticMediaSource {
    async fn acquire(&self, video: bool, audio: bool) -> Result<LocalMedia, CallError> {
        if !video && !audio {
            return Err(CallError::MediaUnavailable("no tracks requested".into()));
        }

        let mut tracks = Vec::new();

        if audio {
            let track = Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    ..Default::default()
                },
                "audio".to_owned(),
                "huddle".to_owned(),
            ));
            tracks.push(LocalTrack::with_rtc(TrackKind::Audio, track));
        }

        if video {
            let track = Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    ..Default::default()
                },
                "video".to_owned(),
                "huddle".to_owned(),
            ));
            tracks.push(LocalTrack::with_rtc(TrackKind::Video, track));
        }

        Ok(LocalMedia { tracks })
    }
}
