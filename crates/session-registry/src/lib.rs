//! Session Registry
//!
//! Owns the map from session id to live per-session state and the
//! start/frame/stop lifecycle. The registry lock covers only
//! create/lookup/remove; each session carries its own mutex so frames
//! for one session are processed strictly in arrival order while
//! different sessions proceed concurrently.

mod registry;

pub use registry::{PipelineConfig, ScoredFrame, SessionRegistry, StartOutcome};

use thiserror::Error;
use video_frame::FrameError;

/// Registry error types; these are the only caller-visible failures
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("session_id is required")]
    MissingSessionId,

    #[error("API key is required")]
    MissingApiKey,

    #[error("Unknown session: {0}")]
    UnknownSession(String),

    #[error("Invalid frame image: {0}")]
    InvalidImage(#[from] FrameError),
}
