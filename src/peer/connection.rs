use std::sync::Arc;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::APIBuilder;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::policy::bundle_policy::RTCBundlePolicy;
use webrtc::peer_connection::policy::rtcp_mux_policy::RTCRtcpMuxPolicy;
use webrtc::peer_connection::RTCPeerConnection;

use crate::config::ServerConfig;
use crate::error::SessionError;

/// Builds a fresh peer connection with the default codecs and interceptors
/// registered, so both media tracks and data channels negotiate. The webrtc
/// crate only speaks unified-plan, which is exactly what this tool expects.
pub async fn new_connection(
    ice_servers: &[ServerConfig],
) -> Result<Arc<RTCPeerConnection>, SessionError> {
    let mut media_engine = MediaEngine::default();
    media_engine
        .register_default_codecs()
        .map_err(|e| SessionError::Negotiation(format!("codec registration failed: {}", e)))?;

    let mut registry = Registry::new();
    registry = register_default_interceptors(registry, &mut media_engine)
        .map_err(|e| SessionError::Negotiation(format!("interceptor setup failed: {}", e)))?;

    let api = APIBuilder::new()
        .with_media_engine(media_engine)
        .with_interceptor_registry(registry)
        .build();

    let config = rtc_config(ice_servers);
    let pc = api
        .new_peer_connection(config)
        .await
        .map_err(|e| SessionError::Negotiation(format!("peer connection failed: {}", e)))?;

    Ok(Arc::new(pc))
}

fn rtc_config(ice_servers: &[ServerConfig]) -> RTCConfiguration {
    RTCConfiguration {
        ice_servers: ice_servers.iter().cloned().map(Into::into).collect(),
        bundle_policy: RTCBundlePolicy::MaxBundle,
        rtcp_mux_policy: RTCRtcpMuxPolicy::Require,
        ..Default::default()
    }
}
