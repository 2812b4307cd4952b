//! Video Frame Handling
//!
//! Provides the decoded RGB frame type consumed by the signal pipeline,
//! plus decoding from the compressed bytes delivered by the boundary.

mod frame;

pub use frame::{decode_frame, VideoFrame};

use thiserror::Error;

/// Frame error types
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Empty frame payload")]
    Empty,

    #[error("Frame dimensions {width}x{height} do not match buffer length {len}")]
    DimensionMismatch { width: u32, height: u32, len: usize },
}
