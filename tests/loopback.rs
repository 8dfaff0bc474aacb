//! Full manual-signaling exchange between two controllers in one process,
//! over host candidates only. The copy-paste steps happen after candidate
//! gathering completes, so the pasted text carries the candidates and no
//! trickle path is needed.
//!
//! Environments without loopback UDP cannot complete ICE; the test skips
//! itself (with a note) instead of failing when connectivity never arrives.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sdpdesk::{
    CaptureRequest, DeviceInfo, EventSink, LocalStream, MediaDevices, RemoteStreamInfo,
    SessionConfig, SessionController, SessionError, StreamInfo,
};

struct NoDevices;

impl MediaDevices for NoDevices {
    fn enumerate(&self) -> Result<Vec<DeviceInfo>, SessionError> {
        Ok(Vec::new())
    }

    fn capture(&self, _request: &CaptureRequest) -> Result<LocalStream, SessionError> {
        Err(SessionError::Capture("no devices".into()))
    }
}

#[derive(Default)]
struct RecordingSink {
    channel_states: Mutex<Vec<(String, String)>>,
    counters: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn has_open_channel(&self) -> bool {
        self.channel_states
            .lock()
            .unwrap()
            .iter()
            .any(|(_, state)| state == "open")
    }

    fn counters(&self) -> Vec<String> {
        self.counters.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn local_description_changed(&self, _sdp: &str) {}
    fn local_stream_ready(&self, _info: &StreamInfo) {}
    fn remote_stream_changed(&self, _info: &RemoteStreamInfo) {}

    fn channel_state_changed(&self, label: &str, state: &str) {
        self.channel_states
            .lock()
            .unwrap()
            .push((label.to_owned(), state.to_owned()));
    }

    fn counter_received(&self, value: &str) {
        self.counters.lock().unwrap().push(value.to_owned());
    }

    fn session_closed(&self) {}
}

fn peer() -> (SessionController, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let config = SessionConfig {
        ice_servers: Vec::new(),
        send_interval: Duration::from_millis(200),
        ..SessionConfig::default()
    };
    let controller = SessionController::with_config(Arc::new(NoDevices), sink.clone(), config);
    (controller, sink)
}

/// Polls `check` until it returns true or the deadline passes.
async fn wait_until<F: Fn() -> bool>(deadline: Duration, check: F) -> bool {
    let started = tokio::time::Instant::now();
    while started.elapsed() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

/// The applied local description once it carries at least one candidate,
/// or `None` when gathering never produces one.
async fn gathered_description(controller: &SessionController) -> Option<String> {
    let started = tokio::time::Instant::now();
    while started.elapsed() < Duration::from_secs(5) {
        if let Some(sdp) = controller.local_description().await {
            if sdp.contains("a=candidate") {
                return Some(sdp);
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    None
}

#[tokio::test]
async fn counter_flows_after_a_copy_paste_exchange() {
    let (caller, caller_sink) = peer();
    let (callee, callee_sink) = peer();

    caller.create_connection().await.unwrap();
    callee.create_connection().await.unwrap();

    let offer = caller.create_offer().await.unwrap();
    caller.commit_local_description(offer).await.unwrap();
    let Some(offer) = gathered_description(&caller).await else {
        eprintln!("skipping: no host candidates gathered");
        return;
    };

    callee.commit_remote_description(offer).await.unwrap();
    let answer = callee.create_answer().await.unwrap();
    callee.commit_local_description(answer).await.unwrap();
    let Some(answer) = gathered_description(&callee).await else {
        eprintln!("skipping: no host candidates gathered");
        return;
    };

    caller.commit_remote_description(answer).await.unwrap();

    if !wait_until(Duration::from_secs(10), || caller_sink.has_open_channel()).await {
        eprintln!("skipping: data channel never opened");
        return;
    }

    // The open channel starts the periodic counter; the callee sees the
    // values in order from zero.
    let received = wait_until(Duration::from_secs(10), || {
        callee_sink.counters().len() >= 2
    })
    .await;
    assert!(received, "no counter values arrived over the open channel");
    let counters = callee_sink.counters();
    assert_eq!(&counters[..2], &["0".to_string(), "1".to_string()]);
    assert!(caller.counter_value() >= 2);

    caller.hangup().await;
    callee.hangup().await;
    assert_eq!(caller.counter_value(), 0);
    assert!(!caller.send_counter().await.unwrap());
}
