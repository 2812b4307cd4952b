//! Coarse face-box gaze tracking

use crate::attention::AttentionState;
use crate::{GazeConfig, GazeDirection, GazeReading, GazeTracker};
use video_frame::VideoFrame;
use vision::{FaceBox, FaceDetector};

/// Gaze tracker working from the face bounding box alone.
///
/// Used when no landmark model is available. Gaze is classified from the
/// face-center offset against the frame center; blink detection needs
/// landmarks and is never reported.
pub struct CoarseGazeTracker {
    config: GazeConfig,
    face_detector: FaceDetector,
    state: AttentionState,
}

impl CoarseGazeTracker {
    pub fn new(config: GazeConfig, face_detector: FaceDetector) -> Self {
        Self {
            state: AttentionState::new(&config),
            config,
            face_detector,
        }
    }

    /// Classify gaze from the face-center offset against the frame center
    fn classify_gaze(&self, face: &FaceBox, frame: &VideoFrame) -> GazeDirection {
        let (face_x, face_y) = face.center();
        let offset_x = ((face_x - frame.width as f32 / 2.0) / frame.width as f32).abs() as f64;
        let offset_y = ((face_y - frame.height as f32 / 2.0) / frame.height as f32).abs() as f64;

        let threshold = self.config.coarse_offset_threshold;
        if offset_x < threshold && offset_y < threshold {
            GazeDirection::Screen
        } else if offset_x > threshold * 2.0 || offset_y > threshold * 2.0 {
            GazeDirection::Away
        } else {
            GazeDirection::Unknown
        }
    }
}

impl GazeTracker for CoarseGazeTracker {
    fn process_frame(&mut self, frame: &VideoFrame, timestamp: f64) -> GazeReading {
        let Some(face) = self.face_detector.detect(frame) else {
            let focus_duration = self.state.update_focus(false, timestamp);
            return GazeReading {
                gaze_direction: GazeDirection::Unknown,
                blink_rate: None,
                eye_movement_stability: 0.0,
                focus_duration,
                face_detected: false,
            };
        };

        let gaze_direction = self.classify_gaze(&face, frame);

        let (center_x, center_y) = face.center();
        self.state.observe_position(center_x as f64, center_y as f64);

        let focus_duration = self
            .state
            .update_focus(gaze_direction == GazeDirection::Screen, timestamp);

        GazeReading {
            gaze_direction,
            blink_rate: None,
            eye_movement_stability: self
                .state
                .stability(self.config.coarse_stability_scale, &self.config),
            focus_duration,
            face_detected: true,
        }
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}
