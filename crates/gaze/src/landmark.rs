//! Landmark-based gaze tracking

use crate::attention::AttentionState;
use crate::{GazeConfig, GazeDirection, GazeReading, GazeTracker};
use signal_buffer::Window;
use tracing::debug;
use video_frame::VideoFrame;
use vision::{
    FaceDetector, FaceLandmarks, LandmarkDetector, LEFT_EYE_CENTER, LEFT_EYE_EAR_POINTS, NOSE_TIP,
    RIGHT_EYE_CENTER, RIGHT_EYE_EAR_POINTS,
};

/// Gaze tracker working from facial landmarks
pub struct LandmarkGazeTracker {
    face_detector: FaceDetector,
    landmark_detector: LandmarkDetector,
    inner: LandmarkState,
}

impl LandmarkGazeTracker {
    pub fn new(
        config: GazeConfig,
        face_detector: FaceDetector,
        landmark_detector: LandmarkDetector,
    ) -> Self {
        Self {
            face_detector,
            landmark_detector,
            inner: LandmarkState::new(config),
        }
    }
}

impl GazeTracker for LandmarkGazeTracker {
    fn process_frame(&mut self, frame: &VideoFrame, timestamp: f64) -> GazeReading {
        let Some(face) = self.face_detector.detect(frame) else {
            return self.inner.absent_reading(timestamp);
        };

        match self.landmark_detector.detect(frame, &face) {
            Ok(landmarks) => self.inner.update(&landmarks, timestamp),
            Err(e) => {
                debug!("Landmark detection failed: {}", e);
                self.inner.absent_reading(timestamp)
            }
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

/// Landmark geometry and rolling state, separated from detection so the
/// tracking rules can be driven with resolved landmark sets
#[derive(Debug)]
pub struct LandmarkState {
    config: GazeConfig,
    ear_history: Window<f64>,
    state: AttentionState,
}

impl LandmarkState {
    pub fn new(config: GazeConfig) -> Self {
        Self {
            ear_history: Window::new(config.ear_history),
            state: AttentionState::new(&config),
            config,
        }
    }

    /// Advance tracking with one frame's landmark set
    pub fn update(&mut self, landmarks: &FaceLandmarks, timestamp: f64) -> GazeReading {
        let left_ear = eye_aspect_ratio(landmarks, &LEFT_EYE_EAR_POINTS);
        let right_ear = eye_aspect_ratio(landmarks, &RIGHT_EYE_EAR_POINTS);
        self.ear_history.push((left_ear + right_ear) / 2.0);

        if self.blink_detected() {
            self.state.record_blink(timestamp, &self.config);
        }

        let gaze_direction = self.classify_gaze(landmarks);

        if let Some((x, y)) = eye_midpoint(landmarks) {
            self.state.observe_position(x, y);
        }

        let focus_duration = self
            .state
            .update_focus(gaze_direction == GazeDirection::Screen, timestamp);

        GazeReading {
            gaze_direction,
            blink_rate: self.state.blink_rate(timestamp, &self.config),
            eye_movement_stability: self
                .state
                .stability(self.config.landmark_stability_scale, &self.config),
            focus_duration,
            face_detected: true,
        }
    }

    /// Reading for a frame with no usable face
    pub fn absent_reading(&mut self, timestamp: f64) -> GazeReading {
        let focus_duration = self.state.update_focus(false, timestamp);
        GazeReading {
            gaze_direction: GazeDirection::Unknown,
            blink_rate: None,
            eye_movement_stability: 0.0,
            focus_duration,
            face_detected: false,
        }
    }

    pub fn reset(&mut self) {
        self.ear_history.clear();
        self.state.reset();
    }

    /// EAR dipped below threshold over the preceding frames and recovered
    /// above it on the current frame
    fn blink_detected(&self) -> bool {
        let n = self.config.blink_consecutive_frames;
        if self.ear_history.len() < n || n < 2 {
            return false;
        }

        let recent: Vec<f64> = self
            .ear_history
            .iter()
            .skip(self.ear_history.len() - n)
            .copied()
            .collect();

        recent[..n - 1]
            .iter()
            .all(|&ear| ear < self.config.ear_threshold)
            && recent[n - 1] > self.config.ear_threshold
    }

    /// Classify gaze from the eye-midpoint offset against the nose anchor,
    /// normalized by inter-eye distance
    fn classify_gaze(&self, landmarks: &FaceLandmarks) -> GazeDirection {
        let (Some(left), Some(right), Some(nose)) = (
            landmarks.point(LEFT_EYE_CENTER),
            landmarks.point(RIGHT_EYE_CENTER),
            landmarks.point(NOSE_TIP),
        ) else {
            return GazeDirection::Unknown;
        };

        let eye_distance = distance(left, right);
        if eye_distance <= f64::EPSILON {
            return GazeDirection::Unknown;
        }

        let mid_x = (left.0 + right.0) as f64 / 2.0;
        let mid_y = (left.1 + right.1) as f64 / 2.0;
        let offset_x = ((mid_x - nose.0 as f64) / eye_distance).abs();
        let offset_y = ((mid_y - nose.1 as f64) / eye_distance).abs();

        let threshold = self.config.gaze_offset_threshold;
        if offset_x < threshold && offset_y < threshold {
            GazeDirection::Screen
        } else if offset_x > threshold * 2.0 || offset_y > threshold * 2.0 {
            GazeDirection::Away
        } else {
            GazeDirection::Unknown
        }
    }
}

/// Midpoint between the two eye-center landmarks
fn eye_midpoint(landmarks: &FaceLandmarks) -> Option<(f64, f64)> {
    let left = landmarks.point(LEFT_EYE_CENTER)?;
    let right = landmarks.point(RIGHT_EYE_CENTER)?;
    Some((
        (left.0 + right.0) as f64 / 2.0,
        (left.1 + right.1) as f64 / 2.0,
    ))
}

/// Eye Aspect Ratio from the 4 keypoints `(top, bottom, left, right)`:
/// `(|top-bottom| + |left-right|) / (2 * |left-right|)`.
///
/// Lower values indicate eyelid closure; the floor of this form is 0.5.
pub fn eye_aspect_ratio(landmarks: &FaceLandmarks, points: &[usize; 4]) -> f64 {
    let (Some(top), Some(bottom), Some(left), Some(right)) = (
        landmarks.point(points[0]),
        landmarks.point(points[1]),
        landmarks.point(points[2]),
        landmarks.point(points[3]),
    ) else {
        return 0.0;
    };

    let vertical = distance(top, bottom);
    let horizontal = distance(left, right);
    if horizontal <= f64::EPSILON {
        return 0.0;
    }

    (vertical + horizontal) / (2.0 * horizontal)
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f64 {
    (((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)) as f64).sqrt()
}
