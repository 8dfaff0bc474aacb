use tauri::{command, State};

use crate::commands::SharedController;
use crate::media::stream::TrackKind;

#[command]
pub async fn create_connection(controller: State<'_, SharedController>) -> Result<(), String> {
    controller.create_connection().await.map_err(|e| {
        log::error!("create_connection failed: {}", e);
        e.to_string()
    })
}

/// Attaches duplicates of the captured audio tracks; returns how many.
#[command]
pub async fn add_audio_track(controller: State<'_, SharedController>) -> Result<usize, String> {
    controller
        .add_track(TrackKind::Audio)
        .await
        .map_err(|e| e.to_string())
}

/// Attaches duplicates of the captured video tracks; returns how many.
#[command]
pub async fn add_video_track(controller: State<'_, SharedController>) -> Result<usize, String> {
    controller
        .add_track(TrackKind::Video)
        .await
        .map_err(|e| e.to_string())
}

/// Generates offer text for the local-description field. The field becomes
/// editable; nothing is applied until `set_local_description`.
#[command]
pub async fn create_offer(controller: State<'_, SharedController>) -> Result<String, String> {
    controller.create_offer().await.map_err(|e| {
        log::error!("create_offer failed: {}", e);
        e.to_string()
    })
}

#[command]
pub async fn create_answer(controller: State<'_, SharedController>) -> Result<String, String> {
    controller.create_answer().await.map_err(|e| {
        log::error!("create_answer failed: {}", e);
        e.to_string()
    })
}

/// Applies the (possibly edited) local-description text.
#[command]
pub async fn set_local_description(
    controller: State<'_, SharedController>,
    sdp: String,
) -> Result<(), String> {
    controller.commit_local_description(sdp).await.map_err(|e| {
        log::error!("set_local_description failed: {}", e);
        e.to_string()
    })
}

/// Applies the pasted remote-description text.
#[command]
pub async fn set_remote_description(
    controller: State<'_, SharedController>,
    sdp: String,
) -> Result<(), String> {
    controller
        .commit_remote_description(sdp)
        .await
        .map_err(|e| {
            log::error!("set_remote_description failed: {}", e);
            e.to_string()
        })
}

#[command]
pub async fn hangup(controller: State<'_, SharedController>) -> Result<(), String> {
    controller.hangup().await;
    Ok(())
}
