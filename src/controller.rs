use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use webrtc::data_channel::RTCDataChannel;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::signaling_state::RTCSignalingState;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;

use crate::config::{validate_servers, ServerConfig, SessionConfig};
use crate::error::SessionError;
use crate::events::{EventSink, RemoteStreamInfo};
use crate::media::devices::{with_placeholder_labels, CaptureRequest, DeviceInfo, MediaDevices};
use crate::media::stream::{StreamInfo, TrackKind};
use crate::peer::connection;
use crate::peer::data_channel::{channel_options, run_counter_loop, send_current, SendOutcome};
use crate::peer::describe::build_description;
use crate::session::Session;

/// Drives one local peer connection through manual copy-paste signaling:
/// capture, connect, negotiate via user-edited description text, exchange a
/// counter over the data channel, and tear down.
///
/// Transitions happen only on explicit calls or platform callbacks; failed
/// steps return an error and the session simply stays where it was. Callers
/// are expected to gate re-entry per operation (disable the triggering
/// control until the call resolves); the controller does not queue
/// overlapping calls of the same kind.
pub struct SessionController {
    session: Arc<Mutex<Session>>,
    devices: Arc<dyn MediaDevices>,
    events: Arc<dyn EventSink>,
    config: Mutex<SessionConfig>,
}

impl SessionController {
    pub fn new(devices: Arc<dyn MediaDevices>, events: Arc<dyn EventSink>) -> Self {
        Self::with_config(devices, events, SessionConfig::default())
    }

    pub fn with_config(
        devices: Arc<dyn MediaDevices>,
        events: Arc<dyn EventSink>,
        config: SessionConfig,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::default())),
            devices,
            events,
            config: Mutex::new(config),
        }
    }

    /// Device list for the selection dropdowns, with generated labels where
    /// the platform reported none.
    pub fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, SessionError> {
        let devices = self.devices.enumerate()?;
        Ok(with_placeholder_labels(devices))
    }

    /// Acquires a local stream for the selected devices. Any prior stream is
    /// stopped and discarded first, so re-acquisition is idempotent; on
    /// capture failure the session holds no stream.
    pub fn request_media(&self, request: CaptureRequest) -> Result<StreamInfo, SessionError> {
        {
            let mut session = self.session.lock().unwrap();
            if let Some(prior) = session.local_stream.take() {
                log::info!("stopping previous local stream {}", prior.id());
                prior.stop();
            }
        }
        log::info!(
            "requesting local stream (audio: {:?}, video: {:?})",
            request.audio_device,
            request.video_device
        );
        let stream = self.devices.capture(&request)?;
        let info = stream.info();
        self.session.lock().unwrap().local_stream = Some(stream);
        self.events.local_stream_ready(&info);
        log::info!("received local stream {}", info.id);
        Ok(info)
    }

    /// Allocates the peer connection, registers the candidate / remote-track
    /// / remote-channel observers, and eagerly creates the ordered outbound
    /// data channel. Refuses to overwrite an existing connection.
    pub async fn create_connection(&self) -> Result<(), SessionError> {
        if self.session.lock().unwrap().pc.is_some() {
            return Err(SessionError::InvalidState(
                "connection already exists; hang up first".into(),
            ));
        }

        let (ice_servers, label, period) = {
            let config = self.config.lock().unwrap();
            (
                config.ice_servers.clone(),
                config.channel_label.clone(),
                config.send_interval,
            )
        };

        let pc = connection::new_connection(&ice_servers).await?;
        self.wire_peer(&pc);

        let dc = match pc.create_data_channel(&label, Some(channel_options())).await {
            Ok(dc) => dc,
            Err(e) => {
                // Nothing was stored yet; release the half-built connection.
                let _ = pc.close().await;
                return Err(SessionError::Channel(format!(
                    "failed to create data channel: {}",
                    e
                )));
            }
        };
        self.wire_send_channel(&dc, period);

        let mut session = self.session.lock().unwrap();
        session.pc = Some(pc);
        session.send_channel = Some(dc);
        log::info!("created peer connection with outbound channel '{}'", label);
        Ok(())
    }

    /// Attaches one duplicate per captured track of `kind`. Returns how many
    /// were attached; zero (with a log line) when the stream has no track of
    /// that kind.
    pub async fn add_track(&self, kind: TrackKind) -> Result<usize, SessionError> {
        let (pc, tracks) = {
            let session = self.session.lock().unwrap();
            let pc = session
                .pc
                .clone()
                .ok_or_else(|| SessionError::InvalidState("create a connection first".into()))?;
            let stream = session
                .local_stream
                .as_ref()
                .ok_or_else(|| SessionError::InvalidState("capture media first".into()))?;
            (pc, stream.tracks_of(kind))
        };

        if tracks.is_empty() {
            log::warn!("no local {:?} track to add", kind);
            return Ok(0);
        }
        log::info!("using {:?} device: {}", kind, tracks[0].label());

        let mut attached = 0;
        for track in &tracks {
            let duplicate = track.duplicate();
            pc.add_track(duplicate.rtp())
                .await
                .map_err(|e| SessionError::Negotiation(format!("failed to add track: {}", e)))?;
            attached += 1;
        }
        log::info!("added {} {:?} track(s) to peer connection", attached, kind);
        Ok(attached)
    }

    /// Generates an offer and reports its text for editing. The description
    /// is not applied; that happens when the user commits the edited text.
    pub async fn create_offer(&self) -> Result<String, SessionError> {
        let pc = self.require_pc()?;
        let offer = pc
            .create_offer(None)
            .await
            .map_err(|e| SessionError::Negotiation(format!("failed to create offer: {}", e)))?;
        self.events.local_description_changed(&offer.sdp);
        Ok(offer.sdp)
    }

    /// Counterpart of [`Self::create_offer`] for the answering side.
    pub async fn create_answer(&self) -> Result<String, SessionError> {
        let pc = self.require_pc()?;
        let answer = pc
            .create_answer(None)
            .await
            .map_err(|e| SessionError::Negotiation(format!("failed to create answer: {}", e)))?;
        self.events.local_description_changed(&answer.sdp);
        Ok(answer.sdp)
    }

    /// Applies user-edited text as the local description. The type is
    /// inferred from the signaling state (stable means a new offer,
    /// anything else answers the exchange in flight).
    pub async fn commit_local_description(&self, sdp: String) -> Result<(), SessionError> {
        let pc = self.require_pc()?;
        let description = build_description(pc.signaling_state(), sdp)?;
        pc.set_local_description(description)
            .await
            .map_err(|e| {
                SessionError::DescriptionApply(format!("failed to set local description: {}", e))
            })?;
        log::info!("local description applied");
        Ok(())
    }

    /// Applies pasted remote text, with the same type inference as the
    /// local side.
    pub async fn commit_remote_description(&self, sdp: String) -> Result<(), SessionError> {
        let pc = self.require_pc()?;
        let description = build_description(pc.signaling_state(), sdp)?;
        pc.set_remote_description(description)
            .await
            .map_err(|e| {
                SessionError::DescriptionApply(format!("failed to set remote description: {}", e))
            })?;
        log::info!("remote description applied");
        Ok(())
    }

    /// One manual counter send. `Ok(false)` when there is no outbound
    /// channel or it is not open; the counter only advances on a successful
    /// send.
    pub async fn send_counter(&self) -> Result<bool, SessionError> {
        let (dc, counter, gate) = {
            let session = self.session.lock().unwrap();
            (
                session.send_channel.clone(),
                session.counter.clone(),
                session.send_gate.clone(),
            )
        };
        let Some(dc) = dc else {
            log::info!("send_counter: no outbound channel");
            return Ok(false);
        };
        match send_current(&dc, &counter, &gate).await {
            SendOutcome::Sent => Ok(true),
            SendOutcome::NotOpen => {
                log::info!("send_counter: channel not open");
                Ok(false)
            }
            SendOutcome::Failed => Err(SessionError::Channel("counter send failed".into())),
        }
    }

    /// Terminal teardown: aborts the periodic send, stops local tracks,
    /// closes both channels and the connection, and resets the session.
    /// Close errors are ignored; there is nothing left to do with them.
    pub async fn hangup(&self) {
        log::info!("ending session");
        let teardown = self.session.lock().unwrap().reset();
        if let Some(stream) = teardown.local_stream {
            stream.stop();
        }
        if let Some(dc) = teardown.send_channel {
            let _ = dc.close().await;
        }
        if let Some(dc) = teardown.receive_channel {
            let _ = dc.close().await;
        }
        if let Some(pc) = teardown.pc {
            let _ = pc.close().await;
        }
        self.events.session_closed();
    }

    /// Replaces the ICE server set used by the next connection.
    pub fn set_ice_servers(&self, servers: Vec<ServerConfig>) -> Result<(), SessionError> {
        validate_servers(&servers)?;
        log::info!("setting {} custom ICE servers", servers.len());
        self.config.lock().unwrap().ice_servers = servers;
        Ok(())
    }

    pub fn get_ice_servers(&self) -> Vec<ServerConfig> {
        self.config.lock().unwrap().ice_servers.clone()
    }

    /// Current local description text, if any has been applied.
    pub async fn local_description(&self) -> Option<String> {
        let pc = self.session.lock().unwrap().pc.clone()?;
        pc.local_description().await.map(|d| d.sdp)
    }

    pub fn is_connected(&self) -> bool {
        self.session
            .lock()
            .unwrap()
            .pc
            .as_ref()
            .map(|pc| pc.connection_state() == RTCPeerConnectionState::Connected)
            .unwrap_or(false)
    }

    pub fn signaling_state(&self) -> Option<RTCSignalingState> {
        self.session
            .lock()
            .unwrap()
            .pc
            .as_ref()
            .map(|pc| pc.signaling_state())
    }

    pub fn has_local_stream(&self) -> bool {
        self.session.lock().unwrap().local_stream.is_some()
    }

    pub fn remote_stream(&self) -> Option<RemoteStreamInfo> {
        self.session.lock().unwrap().remote_stream.clone()
    }

    pub fn counter_value(&self) -> u64 {
        let counter = self.session.lock().unwrap().counter.clone();
        counter.load(Ordering::SeqCst)
    }

    fn require_pc(&self) -> Result<Arc<RTCPeerConnection>, SessionError> {
        self.session
            .lock()
            .unwrap()
            .pc
            .clone()
            .ok_or_else(|| SessionError::InvalidState("create a connection first".into()))
    }

    /// Registers the candidate, state, remote-track and remote-channel
    /// observers. Each handler is registered exactly once per connection.
    fn wire_peer(&self, pc: &Arc<RTCPeerConnection>) {
        // Every gathered candidate lands in the local description; mirror
        // the updated text so the user copies a complete description.
        let events = self.events.clone();
        let pc_weak = Arc::downgrade(pc);
        pc.on_ice_candidate(Box::new(move |candidate| {
            let events = events.clone();
            let pc = pc_weak.upgrade();
            Box::pin(async move {
                match &candidate {
                    Some(c) => log::info!("ICE candidate: {}", c),
                    None => log::info!("ICE candidate gathering completed"),
                }
                if let Some(pc) = pc {
                    if let Some(desc) = pc.local_description().await {
                        events.local_description_changed(&desc.sdp);
                    }
                }
            })
        }));

        pc.on_peer_connection_state_change(Box::new(|state| {
            log::info!("peer connection state: {}", state);
            Box::pin(async {})
        }));

        let events = self.events.clone();
        let session = self.session.clone();
        pc.on_track(Box::new(move |track, _receiver, _transceiver| {
            let events = events.clone();
            let session = session.clone();
            Box::pin(async move {
                log::info!(
                    "remote {} track {} (stream '{}')",
                    track.kind(),
                    track.id(),
                    track.stream_id()
                );
                // Only video drives the remote preview.
                if track.kind() != RTPCodecType::Video {
                    return;
                }
                let info = RemoteStreamInfo::for_track(track.stream_id(), track.id());
                session.lock().unwrap().remote_stream = Some(info.clone());
                events.remote_stream_changed(&info);
            })
        }));

        let events = self.events.clone();
        let session = self.session.clone();
        pc.on_data_channel(Box::new(move |dc| {
            log::info!("remote data channel '{}' offered", dc.label());
            wire_receive_channel(&events, &dc);
            session.lock().unwrap().receive_channel = Some(dc);
            Box::pin(async {})
        }));
    }

    /// The outbound channel drives the periodic counter: start the loop on
    /// open, abort it the moment the state leaves open.
    fn wire_send_channel(&self, dc: &Arc<RTCDataChannel>, period: Duration) {
        let label = dc.label().to_owned();

        {
            let session = self.session.clone();
            let events = self.events.clone();
            let loop_dc = dc.clone();
            let label = label.clone();
            dc.on_open(Box::new(move || {
                log::info!("send channel '{}' open", label);
                events.channel_state_changed(&label, "open");
                let (counter, gate) = {
                    let session = session.lock().unwrap();
                    (session.counter.clone(), session.send_gate.clone())
                };
                let task = tokio::spawn(run_counter_loop(loop_dc.clone(), counter, gate, period));
                if let Some(old) = session.lock().unwrap().send_task.replace(task) {
                    old.abort();
                }
                Box::pin(async {})
            }));
        }

        {
            let session = self.session.clone();
            let events = self.events.clone();
            let label = label.clone();
            dc.on_close(Box::new(move || {
                log::info!("send channel '{}' closed", label);
                if let Some(task) = session.lock().unwrap().send_task.take() {
                    task.abort();
                }
                events.channel_state_changed(&label, "closed");
                Box::pin(async {})
            }));
        }

        let session = self.session.clone();
        let events = self.events.clone();
        dc.on_error(Box::new(move |e| {
            log::error!("send channel '{}' error: {}", label, e);
            if let Some(task) = session.lock().unwrap().send_task.take() {
                task.abort();
            }
            events.channel_state_changed(&label, "error");
            Box::pin(async {})
        }));
    }
}

/// Observers for a channel the remote side offered: counter values in,
/// state transitions reported.
fn wire_receive_channel(events: &Arc<dyn EventSink>, dc: &Arc<RTCDataChannel>) {
    let label = dc.label().to_owned();

    {
        let events = events.clone();
        let label = label.clone();
        dc.on_open(Box::new(move || {
            log::info!("receive channel '{}' open", label);
            events.channel_state_changed(&label, "open");
            Box::pin(async {})
        }));
    }

    {
        let events = events.clone();
        let label = label.clone();
        dc.on_close(Box::new(move || {
            log::info!("receive channel '{}' closed", label);
            events.channel_state_changed(&label, "closed");
            Box::pin(async {})
        }));
    }

    let events = events.clone();
    dc.on_message(Box::new(move |msg| {
        let text = String::from_utf8_lossy(&msg.data).to_string();
        log::info!("received counter: {}", text);
        events.counter_received(&text);
        Box::pin(async {})
    }));
}
