//! Face Vision
//!
//! Computer-vision front end for the vitals pipeline:
//! - Face detection (largest skin-region bounding box)
//! - Optional facial-landmark inference via an ONNX model
//!
//! Landmark capability is probed once at startup; an absent or unloadable
//! model simply downgrades callers to box-only tracking.

mod config;
mod detector;
mod landmarks;

pub use config::VisionConfig;
pub use detector::{FaceBox, FaceDetector};
pub use landmarks::{
    FaceLandmarks, LandmarkDetector, LEFT_EYE_CENTER, LEFT_EYE_EAR_POINTS, NOSE_TIP,
    RIGHT_EYE_CENTER, RIGHT_EYE_EAR_POINTS,
};

use thiserror::Error;

/// Vision error types
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Landmark output malformed: expected {expected} points, got {actual}")]
    MalformedOutput { expected: usize, actual: usize },
}
