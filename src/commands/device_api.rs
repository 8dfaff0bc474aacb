use tauri::{command, State};

use crate::commands::SharedController;
use crate::media::devices::{CaptureRequest, DeviceInfo};
use crate::media::stream::StreamInfo;

/// Device descriptors for the two selection dropdowns. Unlabeled devices
/// come back as "Audio N" / "Video N".
#[command]
pub fn enumerate_devices(
    controller: State<'_, SharedController>,
) -> Result<Vec<DeviceInfo>, String> {
    match controller.enumerate_devices() {
        Ok(devices) => {
            log::info!("found {} devices", devices.len());
            Ok(devices)
        }
        Err(e) => {
            log::error!("device enumeration failed: {}", e);
            Err(e.to_string())
        }
    }
}

/// Captures (or re-captures) the local stream for the selected devices.
#[command]
pub fn request_media(
    controller: State<'_, SharedController>,
    audio_device: Option<String>,
    video_device: Option<String>,
) -> Result<StreamInfo, String> {
    let request = CaptureRequest {
        audio_device,
        video_device,
    };
    controller.request_media(request).map_err(|e| {
        log::error!("media request failed: {}", e);
        e.to_string()
    })
}
