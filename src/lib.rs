//! Manual-signaling WebRTC session plugin.
//!
//! Drives a single peer connection through capture, connect, offer/answer
//! exchange over copy-pasted SDP text, and a periodic counter over a data
//! channel. The plugin manages one [`SessionController`] per app and exposes
//! every step as a Tauri command; state lands back in the frontend through
//! `sdpdesk-*` events.

pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod media;
pub mod peer;
pub mod session;
mod utils;

use std::sync::Arc;

use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, Runtime,
};

pub use config::{ServerConfig, SessionConfig};
pub use controller::SessionController;
pub use error::SessionError;
pub use events::{EventSink, NullEventSink, RemoteStreamInfo};
pub use media::devices::{CaptureRequest, DeviceInfo, DeviceKind, MediaDevices};
pub use media::stream::{LocalStream, StreamInfo, TrackKind};
pub use media::synthetic::SyntheticDevices;

use commands::SharedController;
use events::TauriEventSink;

/// Initialize the plugin with the built-in synthetic devices.
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    init_with(Arc::new(SyntheticDevices::new()), SessionConfig::default())
}

/// Initialize the plugin with a custom device source and session config.
pub fn init_with<R: Runtime>(
    devices: Arc<dyn MediaDevices>,
    config: SessionConfig,
) -> TauriPlugin<R> {
    Builder::new("sdpdesk")
        .invoke_handler(tauri::generate_handler![
            // Devices and capture
            commands::device_api::enumerate_devices,
            commands::device_api::request_media,
            // Connection and negotiation
            commands::session_api::create_connection,
            commands::session_api::add_audio_track,
            commands::session_api::add_video_track,
            commands::session_api::create_offer,
            commands::session_api::create_answer,
            commands::session_api::set_local_description,
            commands::session_api::set_remote_description,
            commands::session_api::hangup,
            // Channel and utilities
            commands::util_api::send_counter,
            commands::util_api::local_description,
            commands::util_api::is_connected,
            commands::util_api::set_ice_servers,
            commands::util_api::get_ice_servers,
        ])
        .setup(move |app, _api| {
            let events = Arc::new(TauriEventSink::new(app.clone()));
            let controller: SharedController =
                Arc::new(SessionController::with_config(devices, events, config));
            app.manage(controller);
            log::info!("sdpdesk plugin initialized");
            Ok(())
        })
        .build()
}

/// Initialize logging for the session controller.
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "sdpdesk=info");
    }
    let _ = env_logger::try_init();
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
