use serde::{Deserialize, Serialize};
use std::time::Duration;
use webrtc::ice_transport::ice_server::RTCIceServer;

use crate::error::SessionError;

/// Configuration of an ICE server as supplied by the frontend.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub id: String,
    pub r#type: String, // 'stun' or 'turn'
    pub url: String,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl ServerConfig {
    /// URL with the protocol scheme prepended when the frontend omitted it.
    pub fn url_with_scheme(&self) -> String {
        if self.url.starts_with("turn:") || self.url.starts_with("stun:") {
            self.url.clone()
        } else {
            let scheme = if self.r#type == "turn" { "turn:" } else { "stun:" };
            format!("{}{}", scheme, self.url)
        }
    }
}

impl From<ServerConfig> for RTCIceServer {
    fn from(config: ServerConfig) -> Self {
        let url = config.url_with_scheme();
        RTCIceServer {
            urls: vec![url],
            username: config.username.unwrap_or_default(),
            credential: config.credential.unwrap_or_default(),
        }
    }
}

/// Rejects empty URLs and TURN servers without credentials.
pub fn validate_servers(servers: &[ServerConfig]) -> Result<(), SessionError> {
    for server in servers {
        if server.url.is_empty() {
            return Err(SessionError::InvalidState(
                "server URL cannot be empty".into(),
            ));
        }
        if server.r#type == "turn" && (server.username.is_none() || server.credential.is_none()) {
            return Err(SessionError::InvalidState(
                "TURN servers require username and credential".into(),
            ));
        }
    }
    Ok(())
}

pub fn default_ice_servers() -> Vec<ServerConfig> {
    vec![
        ServerConfig {
            id: "default-stun-0".into(),
            r#type: "stun".into(),
            url: "stun:stun.l.google.com:19302".into(),
            username: None,
            credential: None,
        },
        ServerConfig {
            id: "default-stun-1".into(),
            r#type: "stun".into(),
            url: "stun:stun1.l.google.com:19302".into(),
            username: None,
            credential: None,
        },
    ]
}

/// Session-wide knobs: an ordered channel and a one-second counter interval
/// by default.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ice_servers: Vec<ServerConfig>,
    pub channel_label: String,
    pub send_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ice_servers: default_ice_servers(),
            channel_label: "sdpdesk-data".into(),
            send_interval: Duration::from_secs(1),
        }
    }
}
