pub mod device_api;
pub mod session_api;
pub mod util_api;

use std::sync::Arc;

use crate::controller::SessionController;

/// The one controller instance managed by the plugin.
pub type SharedController = Arc<SessionController>;
