use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use webrtc::data_channel::RTCDataChannel;
use webrtc::peer_connection::RTCPeerConnection;

use crate::events::RemoteStreamInfo;
use crate::media::stream::LocalStream;

/// Everything one lifetime of the tool tracks. Exactly one `Session` exists
/// per controller; hangup resets every field.
///
/// Locked only for short, non-await sections: callers clone the handles out
/// and drop the lock before awaiting.
#[derive(Default)]
pub struct Session {
    pub pc: Option<Arc<RTCPeerConnection>>,
    pub local_stream: Option<LocalStream>,
    pub send_channel: Option<Arc<RTCDataChannel>>,
    pub receive_channel: Option<Arc<RTCDataChannel>>,
    pub remote_stream: Option<RemoteStreamInfo>,
    pub send_task: Option<JoinHandle<()>>,
    pub counter: Arc<AtomicU64>,
    /// Serializes the manual counter send with the periodic task, so both
    /// cannot load the same value and duplicate it on the wire.
    pub send_gate: Arc<AsyncMutex<()>>,
}

/// Handles taken out of a session on hangup. Closing them is async, so the
/// controller finishes the job outside the session lock.
pub struct Teardown {
    pub pc: Option<Arc<RTCPeerConnection>>,
    pub local_stream: Option<LocalStream>,
    pub send_channel: Option<Arc<RTCDataChannel>>,
    pub receive_channel: Option<Arc<RTCDataChannel>>,
}

impl Session {
    /// Resets every field to the idle state and aborts the periodic send
    /// task. The counter restarts at 0 for the next session.
    pub fn reset(&mut self) -> Teardown {
        if let Some(task) = self.send_task.take() {
            task.abort();
        }
        self.remote_stream = None;
        self.counter.store(0, Ordering::SeqCst);
        Teardown {
            pc: self.pc.take(),
            local_stream: self.local_stream.take(),
            send_channel: self.send_channel.take(),
            receive_channel: self.receive_channel.take(),
        }
    }
}
