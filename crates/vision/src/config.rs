//! Vision configuration

use serde::{Deserialize, Serialize};

/// Vision configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Minimum face box side length (pixels)
    pub min_face_px: u32,

    /// Minimum skin-pixel fill ratio inside a candidate face box
    pub min_fill_ratio: f32,

    /// Facial-landmark ONNX model path (absent = coarse tracking only)
    pub landmark_model_path: Option<String>,

    /// Landmark model input side length (pixels)
    pub landmark_input_size: u32,

    /// Number of landmark points the model emits
    pub landmark_count: usize,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            min_face_px: 100,
            min_fill_ratio: 0.25,
            landmark_model_path: None,
            landmark_input_size: 192,
            landmark_count: 468,
        }
    }
}
