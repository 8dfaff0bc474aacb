use tauri::{command, State};

use crate::commands::SharedController;
use crate::config::ServerConfig;

/// One manual counter send; `false` means the channel was absent or not
/// open (a no-op, not an error).
#[command]
pub async fn send_counter(controller: State<'_, SharedController>) -> Result<bool, String> {
    controller.send_counter().await.map_err(|e| e.to_string())
}

/// Current local description text, for refreshing the field.
#[command]
pub async fn local_description(
    controller: State<'_, SharedController>,
) -> Result<Option<String>, String> {
    Ok(controller.local_description().await)
}

#[command]
pub fn is_connected(controller: State<'_, SharedController>) -> bool {
    controller.is_connected()
}

#[command]
pub fn set_ice_servers(
    controller: State<'_, SharedController>,
    servers: Vec<ServerConfig>,
) -> Result<(), String> {
    controller.set_ice_servers(servers).map_err(|e| {
        log::error!("set_ice_servers failed: {}", e);
        e.to_string()
    })
}

#[command]
pub fn get_ice_servers(controller: State<'_, SharedController>) -> Vec<ServerConfig> {
    controller.get_ice_servers()
}
