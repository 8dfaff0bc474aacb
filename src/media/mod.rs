pub mod devices;
pub mod stream;
pub mod synthetic;

pub use devices::{with_placeholder_labels, CaptureRequest, DeviceInfo, DeviceKind, MediaDevices};
pub use stream::{LocalStream, LocalTrack, StreamInfo, TrackInfo, TrackKind};
pub use synthetic::SyntheticDevices;
