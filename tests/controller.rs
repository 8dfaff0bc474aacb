//! Controller-level tests against a mock capture backend and a recording
//! event sink. Everything here runs offline: connections are created with an
//! empty ICE server list and descriptions are exchanged in-process.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use webrtc::peer_connection::signaling_state::RTCSignalingState;

use sdpdesk::media::stream::LocalTrack;
use sdpdesk::{
    CaptureRequest, DeviceInfo, EventSink, LocalStream, MediaDevices, RemoteStreamInfo,
    ServerConfig, SessionConfig, SessionController, SessionError, StreamInfo, TrackKind,
};

/// Produces streams with a fixed set of track kinds and keeps a clone of
/// every track it ever created, so tests can observe liveness after the
/// stream itself has been consumed by the session.
struct MockDevices {
    kinds: Vec<TrackKind>,
    created: Mutex<Vec<LocalTrack>>,
    fail: bool,
}

impl MockDevices {
    fn new(kinds: Vec<TrackKind>) -> Arc<Self> {
        Arc::new(Self {
            kinds,
            created: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            kinds: Vec::new(),
            created: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    fn created_tracks(&self) -> Vec<LocalTrack> {
        self.created.lock().unwrap().clone()
    }
}

impl MediaDevices for MockDevices {
    fn enumerate(&self) -> Result<Vec<DeviceInfo>, SessionError> {
        Ok(Vec::new())
    }

    fn capture(&self, _request: &CaptureRequest) -> Result<LocalStream, SessionError> {
        if self.fail {
            return Err(SessionError::Capture("backend unavailable".into()));
        }
        let tracks: Vec<LocalTrack> = self
            .kinds
            .iter()
            .map(|kind| LocalTrack::new(*kind, "Mock Device", "mock-stream"))
            .collect();
        self.created.lock().unwrap().extend(tracks.iter().cloned());
        Ok(LocalStream::new(tracks))
    }
}

#[derive(Default)]
struct RecordingSink {
    descriptions: Mutex<Vec<String>>,
    streams: Mutex<Vec<StreamInfo>>,
    channel_states: Mutex<Vec<(String, String)>>,
    counters: Mutex<Vec<String>>,
    closed: Mutex<usize>,
}

impl EventSink for RecordingSink {
    fn local_description_changed(&self, sdp: &str) {
        self.descriptions.lock().unwrap().push(sdp.to_owned());
    }

    fn local_stream_ready(&self, info: &StreamInfo) {
        self.streams.lock().unwrap().push(info.clone());
    }

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

    fn session_closed(&self) {
        *self.closed.lock().unwrap() += 1;
    }
}

fn offline_config() -> SessionConfig {
    SessionConfig {
        ice_servers: Vec::new(),
        send_interval: Duration::from_millis(100),
        ..SessionConfig::default()
    }
}

fn controller(devices: Arc<MockDevices>) -> (SessionController, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let controller = SessionController::with_config(devices, sink.clone(), offline_config());
    (controller, sink)
}

#[tokio::test]
async fn recapture_stops_the_previous_stream() {
    let devices = MockDevices::new(vec![TrackKind::Audio, TrackKind::Video]);
    let (controller, sink) = controller(devices.clone());

    let first = controller.request_media(CaptureRequest::default()).unwrap();
    let second = controller.request_media(CaptureRequest::default()).unwrap();
    assert_ne!(first.id, second.id);
    assert!(controller.has_local_stream());

    // Tracks of the first capture are dead, tracks of the second still live.
    let tracks = devices.created_tracks();
    assert_eq!(tracks.len(), 4);
    assert!(tracks[..2].iter().all(|t| !t.is_live()));
    assert!(tracks[2..].iter().all(|t| t.is_live()));

    assert_eq!(sink.streams.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn failed_capture_leaves_no_stream() {
    let (controller, sink) = controller(MockDevices::failing());

    let result = controller.request_media(CaptureRequest::default());
    assert!(matches!(result, Err(SessionError::Capture(_))));
    assert!(!controller.has_local_stream());
    assert!(sink.streams.lock().unwrap().is_empty());
}

#[tokio::test]
async fn add_track_requires_connection_and_capture() {
    let devices = MockDevices::new(vec![TrackKind::Audio]);
    let (controller, _sink) = controller(devices);

    let result = controller.add_track(TrackKind::Audio).await;
    assert!(matches!(result, Err(SessionError::InvalidState(_))));

    controller.create_connection().await.unwrap();
    let result = controller.add_track(TrackKind::Audio).await;
    assert!(matches!(result, Err(SessionError::InvalidState(_))));

    controller.request_media(CaptureRequest::default()).unwrap();
    assert_eq!(controller.add_track(TrackKind::Audio).await.unwrap(), 1);
}

#[tokio::test]
async fn second_create_connection_is_rejected() {
    let (controller, _sink) = controller(MockDevices::new(Vec::new()));

    controller.create_connection().await.unwrap();
    let result = controller.create_connection().await;
    assert!(matches!(result, Err(SessionError::InvalidState(_))));
}

#[tokio::test]
async fn missing_kind_attaches_zero_tracks() {
    let devices = MockDevices::new(vec![TrackKind::Audio]);
    let (controller, _sink) = controller(devices);

    controller.request_media(CaptureRequest::default()).unwrap();
    controller.create_connection().await.unwrap();

    assert_eq!(controller.add_track(TrackKind::Video).await.unwrap(), 0);
    assert_eq!(controller.add_track(TrackKind::Audio).await.unwrap(), 1);

    let offer = controller.create_offer().await.unwrap();
    assert!(offer.contains("m=audio"));
    assert!(!offer.contains("m=video"));
}

#[tokio::test]
async fn offer_text_is_reported_but_not_applied() {
    let (controller, sink) = controller(MockDevices::new(Vec::new()));
    controller.create_connection().await.unwrap();

    let offer = controller.create_offer().await.unwrap();
    assert!(offer.starts_with("v=0"));
    assert_eq!(sink.descriptions.lock().unwrap().last(), Some(&offer));

    // Creation alone leaves the connection untouched.
    assert_eq!(
        controller.signaling_state(),
        Some(RTCSignalingState::Stable)
    );
    assert!(controller.local_description().await.is_none());
}

#[tokio::test]
async fn committing_local_text_applies_it_as_an_offer() {
    let (controller, _sink) = controller(MockDevices::new(Vec::new()));
    controller.create_connection().await.unwrap();

    let offer = controller.create_offer().await.unwrap();
    controller.commit_local_description(offer).await.unwrap();

    assert_eq!(
        controller.signaling_state(),
        Some(RTCSignalingState::HaveLocalOffer)
    );
    assert!(controller.local_description().await.is_some());
}

#[tokio::test]
async fn garbage_description_text_is_rejected() {
    let (controller, _sink) = controller(MockDevices::new(Vec::new()));
    controller.create_connection().await.unwrap();

    let result = controller
        .commit_local_description("not an sdp".into())
        .await;
    assert!(matches!(result, Err(SessionError::DescriptionApply(_))));
    assert_eq!(
        controller.signaling_state(),
        Some(RTCSignalingState::Stable)
    );
}

#[tokio::test]
async fn offer_answer_exchange_reaches_stable_on_both_sides() {
    let (caller, _caller_sink) = controller(MockDevices::new(Vec::new()));
    let (callee, _callee_sink) = controller(MockDevices::new(Vec::new()));

    caller.create_connection().await.unwrap();
    callee.create_connection().await.unwrap();

    // Caller side: create, commit locally, hand the text over.
    let offer = caller.create_offer().await.unwrap();
    caller.commit_local_description(offer.clone()).await.unwrap();

    // Callee side: paste the offer, answer, commit locally.
    callee.commit_remote_description(offer).await.unwrap();
    assert_eq!(
        callee.signaling_state(),
        Some(RTCSignalingState::HaveRemoteOffer)
    );
    let answer = callee.create_answer().await.unwrap();
    callee
        .commit_local_description(answer.clone())
        .await
        .unwrap();
    assert_eq!(
        callee.signaling_state(),
        Some(RTCSignalingState::Stable)
    );

    // Back on the caller: paste the answer.
    caller.commit_remote_description(answer).await.unwrap();
    assert_eq!(
        caller.signaling_state(),
        Some(RTCSignalingState::Stable)
    );
}

#[tokio::test]
async fn send_counter_is_a_noop_without_an_open_channel() {
    let (controller, _sink) = controller(MockDevices::new(Vec::new()));

    // No connection at all.
    assert!(!controller.send_counter().await.unwrap());

    // Connection exists but the channel never opened.
    controller.create_connection().await.unwrap();
    assert!(!controller.send_counter().await.unwrap());
    assert_eq!(controller.counter_value(), 0);
}

#[tokio::test]
async fn hangup_resets_the_session() {
    let devices = MockDevices::new(vec![TrackKind::Audio, TrackKind::Video]);
    let (controller, sink) = controller(devices.clone());

    controller.request_media(CaptureRequest::default()).unwrap();
    controller.create_connection().await.unwrap();
    controller.add_track(TrackKind::Video).await.unwrap();

    controller.hangup().await;

    assert!(!controller.has_local_stream());
    assert!(devices.created_tracks().iter().all(|t| !t.is_live()));
    assert!(controller.signaling_state().is_none());
    assert!(!controller.send_counter().await.unwrap());
    assert_eq!(controller.counter_value(), 0);
    assert!(controller.remote_stream().is_none());
    assert_eq!(*sink.closed.lock().unwrap(), 1);

    // The session is reusable after teardown.
    controller.create_connection().await.unwrap();
}

#[tokio::test]
async fn ice_server_updates_are_validated() {
    let (controller, _sink) = controller(MockDevices::new(Vec::new()));

    let bad = vec![ServerConfig {
        id: "custom-0".into(),
        r#type: "turn".into(),
        url: "turn.example.org".into(),
        username: None,
        credential: None,
    }];
    assert!(controller.set_ice_servers(bad).is_err());
    assert!(controller.get_ice_servers().is_empty());

    let good = vec![ServerConfig {
        id: "custom-0".into(),
        r#type: "stun".into(),
        url: "stun.example.org:3478".into(),
        username: None,
        credential: None,
    }];
    controller.set_ice_servers(good).unwrap();
    assert_eq!(controller.get_ice_servers().len(), 1);
    assert_eq!(controller.get_ice_servers()[0].id, "custom-0");
}
