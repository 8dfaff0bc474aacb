use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::media::stream::LocalStream;

/// Kind of a capture device, mirroring the platform's enumeration kinds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    AudioInput,
    VideoInput,
}

/// One entry of the device list shown in the selection dropdowns.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeviceInfo {
    pub id: String,
    pub kind: DeviceKind,
    pub label: String,
}

/// Device selection for a capture request. `None` means "any device of that
/// kind"; capture backends may still produce a track for it.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CaptureRequest {
    pub audio_device: Option<String>,
    pub video_device: Option<String>,
}

/// Capture capability consumed by the controller. Implementations wrap
/// whatever capture stack the embedding application uses; this crate ships
/// [`crate::media::SyntheticDevices`] for offline use.
pub trait MediaDevices: Send + Sync {
    fn enumerate(&self) -> Result<Vec<DeviceInfo>, SessionError>;
    fn capture(&self, request: &CaptureRequest) -> Result<LocalStream, SessionError>;
}

/// Substitutes generated labels for devices the platform reported without
/// one (permission not granted yet). The counter is 1-based per kind and
/// follows first-seen order, so an unlabeled second microphone becomes
/// "Audio 2" even when the first one had a real label.
pub fn with_placeholder_labels(devices: Vec<DeviceInfo>) -> Vec<DeviceInfo> {
    let mut audio_count = 0;
    let mut video_count = 0;
    devices
        .into_iter()
        .map(|mut device| {
            match device.kind {
                DeviceKind::AudioInput => {
                    audio_count += 1;
                    if device.label.is_empty() {
                        device.label = format!("Audio {}", audio_count);
                    }
                }
                DeviceKind::VideoInput => {
                    video_count += 1;
                    if device.label.is_empty() {
                        device.label = format!("Video {}", video_count);
                    }
                }
            }
            device
        })
        .collect()
}
