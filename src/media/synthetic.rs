//! Synthetic capture backend for offline testing and demos.
//!
//! Stands in for a real capture stack: a fixed microphone/camera pair whose
//! tracks carry no samples but negotiate and attach like real ones.

use crate::error::SessionError;
use crate::media::devices::{CaptureRequest, DeviceInfo, DeviceKind, MediaDevices};
use crate::media::stream::{LocalStream, LocalTrack, TrackKind};

pub const SYNTHETIC_AUDIO_ID: &str = "synthetic-audio-0";
pub const SYNTHETIC_VIDEO_ID: &str = "synthetic-video-0";

/// One unlabeled microphone and one labeled camera, which together exercise
/// both branches of the placeholder-label policy.
#[derive(Default)]
pub struct SyntheticDevices;

impl SyntheticDevices {
    pub fn new() -> Self {
        Self
    }

    fn known(id: &str) -> bool {
        id == SYNTHETIC_AUDIO_ID || id == SYNTHETIC_VIDEO_ID
    }
}

impl MediaDevices for SyntheticDevices {
    fn enumerate(&self) -> Result<Vec<DeviceInfo>, SessionError> {
        Ok(vec![
            DeviceInfo {
                id: SYNTHETIC_AUDIO_ID.into(),
                kind: DeviceKind::AudioInput,
                label: String::new(),
            },
            DeviceInfo {
                id: SYNTHETIC_VIDEO_ID.into(),
                kind: DeviceKind::VideoInput,
                label: "Synthetic Camera".into(),
            },
        ])
    }

    fn capture(&self, request: &CaptureRequest) -> Result<LocalStream, SessionError> {
        for selected in [&request.audio_device, &request.video_device]
            .into_iter()
            .flatten()
        {
            if !Self::known(selected) {
                return Err(SessionError::Capture(format!(
                    "unknown device: {}",
                    selected
                )));
            }
        }

        let stream_id = "synthetic";
        let tracks = vec![
            LocalTrack::new(TrackKind::Audio, "Synthetic Microphone", stream_id),
            LocalTrack::new(TrackKind::Video, "Synthetic Camera", stream_id),
        ];
        Ok(LocalStream::new(tracks))
    }
}
