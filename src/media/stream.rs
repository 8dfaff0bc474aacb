use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_local::TrackLocal;

use crate::utils::random_id;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

fn codec_for(kind: TrackKind) -> RTCRtpCodecCapability {
    match kind {
        TrackKind::Audio => RTCRtpCodecCapability {
            mime_type: MIME_TYPE_OPUS.to_owned(),
            clock_rate: 48000,
            channels: 2,
            ..Default::default()
        },
        TrackKind::Video => RTCRtpCodecCapability {
            mime_type: MIME_TYPE_VP8.to_owned(),
            clock_rate: 90000,
            ..Default::default()
        },
    }
}

/// A captured local track: a sample-based RTP track plus the liveness flag
/// the capture backend checks before writing further samples.
///
/// Duplicates attached to the connection register with the original's
/// sample fan-out, so one [`LocalTrack::write_sample`] call on the captured
/// track feeds the preview and every attached copy.
#[derive(Clone)]
pub struct LocalTrack {
    id: String,
    kind: TrackKind,
    label: String,
    stream_id: String,
    rtp: Arc<TrackLocalStaticSample>,
    outputs: Arc<Mutex<Vec<Arc<TrackLocalStaticSample>>>>,
    live: Arc<AtomicBool>,
}

impl LocalTrack {
    pub fn new(kind: TrackKind, label: &str, stream_id: &str) -> Self {
        let id = format!("track-{}", random_id());
        let rtp = Arc::new(TrackLocalStaticSample::new(
            codec_for(kind),
            id.clone(),
            stream_id.to_owned(),
        ));
        Self {
            id,
            kind,
            label: label.to_owned(),
            stream_id: stream_id.to_owned(),
            outputs: Arc::new(Mutex::new(vec![rtp.clone()])),
            rtp,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Copy of this track with a fresh id and lifecycle, suitable for
    /// attaching to the peer connection while the original keeps feeding
    /// the local preview. Its RTP track joins the original's fan-out, so
    /// backend writes reach the connection too.
    pub fn duplicate(&self) -> Self {
        let id = format!("{}-{}", self.id, random_id());
        let rtp = Arc::new(TrackLocalStaticSample::new(
            codec_for(self.kind),
            id.clone(),
            self.stream_id.clone(),
        ));
        self.outputs.lock().unwrap().push(rtp.clone());
        Self {
            id,
            kind: self.kind,
            label: self.label.clone(),
            stream_id: self.stream_id.clone(),
            rtp,
            outputs: self.outputs.clone(),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Writes one media sample to every RTP track in the fan-out. Tracks
    /// not (yet) bound to a connection accept and drop the sample.
    pub async fn write_sample(&self, sample: &Sample) {
        let outputs: Vec<_> = self.outputs.lock().unwrap().clone();
        for rtp in outputs {
            if let Err(e) = rtp.write_sample(sample).await {
                log::warn!("sample write failed on {}: {}", self.id, e);
            }
        }
    }

    pub fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The underlying RTP track, coerced for `RTCPeerConnection::add_track`.
    pub fn rtp(&self) -> Arc<dyn TrackLocal + Send + Sync> {
        self.rtp.clone()
    }
}

/// The set of tracks produced by one capture request.
pub struct LocalStream {
    id: String,
    tracks: Vec<LocalTrack>,
}

impl LocalStream {
    pub fn new(tracks: Vec<LocalTrack>) -> Self {
        Self {
            id: format!("stream-{}", random_id()),
            tracks,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tracks(&self) -> &[LocalTrack] {
        &self.tracks
    }

    pub fn tracks_of(&self, kind: TrackKind) -> Vec<LocalTrack> {
        self.tracks
            .iter()
            .filter(|t| t.kind() == kind)
            .cloned()
            .collect()
    }

    /// Stops every track. Used both when a new capture replaces this stream
    /// and on hangup.
    pub fn stop(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }

    pub fn info(&self) -> StreamInfo {
        StreamInfo {
            id: self.id.clone(),
            tracks: self
                .tracks
                .iter()
                .map(|t| TrackInfo {
                    id: t.id().to_owned(),
                    kind: t.kind(),
                    label: t.label().to_owned(),
                })
                .collect(),
        }
    }
}

/// Serializable summary of a local stream, handed to the frontend for the
/// preview surface.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StreamInfo {
    pub id: String,
    pub tracks: Vec<TrackInfo>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TrackInfo {
    pub id: String,
    pub kind: TrackKind,
    pub label: String,
}
