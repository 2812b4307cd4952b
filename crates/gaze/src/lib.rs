//! Gaze Tracking
//!
//! Tracks where the subject is looking, blink rate, eye-movement
//! stability, and how long the current on-screen attention run has
//! lasted. Two interchangeable variants sit behind one trait:
//!
//! - [`LandmarkGazeTracker`] works from facial landmarks (EAR blinks,
//!   nose-anchored gaze offsets)
//! - [`CoarseGazeTracker`] falls back to face-box geometry when no
//!   landmark model is available (no blink detection)
//!
//! The variant is chosen once at construction by probing landmark
//! capability, never per frame.

mod attention;
mod coarse;
mod config;
mod landmark;

pub use coarse::CoarseGazeTracker;
pub use config::GazeConfig;
pub use landmark::{eye_aspect_ratio, LandmarkGazeTracker, LandmarkState};

use serde::{Deserialize, Serialize};
use tracing::info;
use video_frame::VideoFrame;
use vision::{FaceDetector, LandmarkDetector, VisionConfig};

/// Where the subject is looking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GazeDirection {
    Screen,
    Away,
    #[default]
    Unknown,
}

/// Per-frame gaze tracking output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazeReading {
    /// Gaze classification for this frame
    pub gaze_direction: GazeDirection,
    /// Blinks per minute over the recent window, when measurable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blink_rate: Option<f64>,
    /// Eye-movement stability, 0-100
    pub eye_movement_stability: f64,
    /// Seconds of the current consecutive on-screen run
    pub focus_duration: f64,
    /// Whether a face was found in this frame
    pub face_detected: bool,
}

/// Contract shared by both tracker variants
pub trait GazeTracker: Send {
    /// Process one frame; always returns a reading (absent face yields
    /// `unknown` gaze with zeroed stability)
    fn process_frame(&mut self, frame: &VideoFrame, timestamp: f64) -> GazeReading;

    /// Clear all tracked state
    fn reset(&mut self);
}

/// Select the tracker variant by probing detector capability once.
pub fn select_tracker(vision: &VisionConfig, config: GazeConfig) -> Box<dyn GazeTracker> {
    match LandmarkDetector::probe(vision) {
        Some(landmarks) => {
            info!("Landmark-capable detector found; using landmark gaze tracker");
            Box::new(LandmarkGazeTracker::new(
                config,
                FaceDetector::new(vision),
                landmarks,
            ))
        }
        None => {
            info!("No landmark capability; using coarse gaze tracker");
            Box::new(CoarseGazeTracker::new(config, FaceDetector::new(vision)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_selects_coarse_without_model() {
        let mut tracker = select_tracker(&VisionConfig::default(), GazeConfig::default());
        // Coarse variant never reports a blink rate
        let frame = VideoFrame::new(vec![0u8; 320 * 240 * 3], 320, 240, 0.0).unwrap();
        let reading = tracker.process_frame(&frame, 0.0);
        assert!(reading.blink_rate.is_none());
        assert!(!reading.face_detected);
    }
}
