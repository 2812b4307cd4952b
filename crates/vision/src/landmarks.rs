//! Facial-landmark inference via ONNX

use crate::{FaceBox, VisionConfig, VisionError};
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use tracing::{info, warn};
use video_frame::VideoFrame;

/// Landmark indices for the Eye-Aspect-Ratio keypoints, face-mesh
/// convention: `[top, bottom, left, right]` per eye.
pub const LEFT_EYE_EAR_POINTS: [usize; 4] = [159, 145, 33, 133];
pub const RIGHT_EYE_EAR_POINTS: [usize; 4] = [386, 374, 362, 263];

/// Eye-corner landmarks used as eye centers for gaze estimation
pub const LEFT_EYE_CENTER: usize = 33;
pub const RIGHT_EYE_CENTER: usize = 362;

/// Stable facial anchor (nose tip)
pub const NOSE_TIP: usize = 1;

/// Facial landmarks, normalized to the full frame (`x`, `y` in [0,1])
#[derive(Debug, Clone)]
pub struct FaceLandmarks {
    points: Vec<(f32, f32)>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<(f32, f32)>) -> Self {
        Self { points }
    }

    /// Landmark point by face-mesh index
    pub fn point(&self, index: usize) -> Option<(f32, f32)> {
        self.points.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Facial-landmark detector backed by an ONNX session.
///
/// Construction is a capability probe: `None` when no model is configured
/// or the model fails to load, which selects box-only gaze tracking for
/// the rest of the process lifetime.
pub struct LandmarkDetector {
    session: Session,
    input_size: u32,
    landmark_count: usize,
}

impl LandmarkDetector {
    /// Probe for landmark capability
    pub fn probe(config: &VisionConfig) -> Option<Self> {
        let path = config.landmark_model_path.as_ref()?;

        let session = Session::builder()
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.commit_from_file(path));

        match session {
            Ok(session) => {
                info!("Loaded facial-landmark model from {}", path);
                Some(Self {
                    session,
                    input_size: config.landmark_input_size,
                    landmark_count: config.landmark_count,
                })
            }
            Err(e) => {
                warn!("Facial-landmark model unavailable ({}); box-only tracking", e);
                None
            }
        }
    }

    /// Detect landmarks within the given face box.
    ///
    /// Output coordinates are normalized to the full frame.
    pub fn detect(
        &self,
        frame: &VideoFrame,
        face: &FaceBox,
    ) -> Result<FaceLandmarks, VisionError> {
        let crop_x = (face.x.max(0.0) as u32).min(frame.width.saturating_sub(1));
        let crop_y = (face.y.max(0.0) as u32).min(frame.height.saturating_sub(1));
        let crop_w = (face.width as u32).min(frame.width - crop_x).max(1);
        let crop_h = (face.height as u32).min(frame.height - crop_y).max(1);

        let crop = frame
            .crop(crop_x, crop_y, crop_w, crop_h)
            .ok_or_else(|| VisionError::ImageProcessing("face crop out of bounds".into()))?;
        let resized = crop.resize(self.input_size, self.input_size);

        let size = self.input_size as usize;
        let mut input = Array4::<f32>::zeros((1, 3, size, size));
        for y in 0..self.input_size {
            for x in 0..self.input_size {
                let idx = ((y * self.input_size + x) * 3) as usize;
                input[[0, 0, y as usize, x as usize]] = resized.data[idx] as f32 / 255.0;
                input[[0, 1, y as usize, x as usize]] = resized.data[idx + 1] as f32 / 255.0;
                input[[0, 2, y as usize, x as usize]] = resized.data[idx + 2] as f32 / 255.0;
            }
        }

        let outputs = self
            .session
            .run(ort::inputs![input].map_err(|e| VisionError::Inference(e.to_string()))?)
            .map_err(|e| VisionError::Inference(e.to_string()))?;

        let tensor = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| VisionError::Inference(e.to_string()))?;
        let flat: Vec<f32> = tensor.iter().copied().collect();

        if flat.len() < self.landmark_count * 3 {
            return Err(VisionError::MalformedOutput {
                expected: self.landmark_count,
                actual: flat.len() / 3,
            });
        }

        // Model emits (x, y, z) in input-pixel units; map back through the
        // crop into full-frame normalized coordinates.
        let points = flat
            .chunks(3)
            .take(self.landmark_count)
            .map(|p| {
                let rel_x = p[0] / self.input_size as f32;
                let rel_y = p[1] / self.input_size as f32;
                (
                    (crop_x as f32 + rel_x * crop_w as f32) / frame.width as f32,
                    (crop_y as f32 + rel_y * crop_h as f32) / frame.height as f32,
                )
            })
            .collect();

        Ok(FaceLandmarks::new(points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_without_model_path() {
        let config = VisionConfig::default();
        assert!(LandmarkDetector::probe(&config).is_none());
    }

    #[test]
    fn test_probe_with_missing_file() {
        let config = VisionConfig {
            landmark_model_path: Some("/nonexistent/landmarks.onnx".to_string()),
            ..Default::default()
        };
        assert!(LandmarkDetector::probe(&config).is_none());
    }

    #[test]
    fn test_landmark_indexing() {
        let points: Vec<(f32, f32)> = (0..468).map(|i| (i as f32 / 468.0, 0.5)).collect();
        let landmarks = FaceLandmarks::new(points);
        assert_eq!(landmarks.len(), 468);
        assert!(landmarks.point(NOSE_TIP).is_some());
        assert!(landmarks.point(LEFT_EYE_EAR_POINTS[0]).is_some());
        assert!(landmarks.point(1000).is_none());
    }
}
