pub mod connection;
pub mod data_channel;
pub mod describe;

pub use describe::{build_description, infer_sdp_type};
