use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Emitter, Runtime};

use crate::media::stream::StreamInfo;

/// What the controller knows about a remote stream it should display.
/// When a track arrives without a stream id, one is synthesized so the
/// display surface still has something to bind to.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RemoteStreamInfo {
    pub stream_id: String,
    pub track_id: String,
}

impl RemoteStreamInfo {
    pub fn for_track(stream_id: String, track_id: String) -> Self {
        let stream_id = if stream_id.is_empty() {
            format!("stream-{}", track_id)
        } else {
            stream_id
        };
        Self {
            stream_id,
            track_id,
        }
    }
}

/// UI-visible effects of the session, reported through explicit observer
/// registration instead of ad hoc handler overwrites. The Tauri
/// implementation forwards them as app events; tests install a recording
/// sink.
pub trait EventSink: Send + Sync {
    /// The local-description text field should now show `sdp`. Fired after
    /// offer/answer creation and after each ICE candidate lands in the
    /// local description.
    fn local_description_changed(&self, sdp: &str);

    /// A capture finished; the local preview should bind to this stream.
    fn local_stream_ready(&self, info: &StreamInfo);

    /// A remote video track arrived; the remote preview should bind to it.
    fn remote_stream_changed(&self, info: &RemoteStreamInfo);

    /// A data channel changed state ("open", "closed", ...).
    fn channel_state_changed(&self, label: &str, state: &str);

    /// The inbound channel delivered a counter value.
    fn counter_received(&self, value: &str);

    /// Hangup finished; dependent controls should disable and capture
    /// should re-enable.
    fn session_closed(&self);
}

/// Forwards every sink call as a Tauri app event, mirroring how the
/// frontend of this tool consumes them.
pub struct TauriEventSink<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> TauriEventSink<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }

    fn emit<P: Serialize + Clone>(&self, event: &str, payload: P) {
        if let Err(e) = self.app.emit(event, payload) {
            log::error!("failed to emit {}: {}", event, e);
        }
    }
}

impl<R: Runtime> EventSink for TauriEventSink<R> {
    fn local_description_changed(&self, sdp: &str) {
        self.emit("sdpdesk-local-description", sdp.to_owned());
    }

    fn local_stream_ready(&self, info: &StreamInfo) {
        self.emit("sdpdesk-local-stream", info.clone());
    }

    fn remote_stream_changed(&self, info: &RemoteStreamInfo) {
        self.emit("sdpdesk-remote-stream", info.clone());
    }

    fn channel_state_changed(&self, label: &str, state: &str) {
        self.emit(
            "sdpdesk-channel-state",
            serde_json::json!({ "label": label, "state": state }),
        );
    }

    fn counter_received(&self, value: &str) {
        self.emit("sdpdesk-counter", value.to_owned());
    }

    fn session_closed(&self) {
        self.emit("sdpdesk-closed", ());
    }
}

/// Sink for embedders that only want the command surface.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn local_description_changed(&self, _sdp: &str) {}
    fn local_stream_ready(&self, _info: &StreamInfo) {}
    fn remote_stream_changed(&self, _info: &RemoteStreamInfo) {}
    fn channel_state_changed(&self, _label: &str, _state: &str) {}
    fn counter_received(&self, _value: &str) {}
    fn session_closed(&self) {}
}
