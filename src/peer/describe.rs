use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::signaling_state::RTCSignalingState;

use crate::error::SessionError;

/// Description type to use for text committed while the connection is in
/// the given signaling state: an offer starts a new exchange, anything
/// already in flight is answered. The same inference applies to the local
/// and the remote field.
pub fn infer_sdp_type(state: RTCSignalingState) -> RTCSdpType {
    if state == RTCSignalingState::Stable {
        RTCSdpType::Offer
    } else {
        RTCSdpType::Answer
    }
}

/// Builds a platform description of the inferred type from user-edited text.
/// Rejected text (the platform refuses to even wrap it) is a
/// [`SessionError::DescriptionApply`].
pub fn build_description(
    state: RTCSignalingState,
    sdp: String,
) -> Result<RTCSessionDescription, SessionError> {
    let result = match infer_sdp_type(state) {
        RTCSdpType::Offer => RTCSessionDescription::offer(sdp),
        _ => RTCSessionDescription::answer(sdp),
    };
    result.map_err(|e| SessionError::DescriptionApply(format!("invalid description text: {}", e)))
}
