//! Gaze tracking configuration

use serde::{Deserialize, Serialize};

/// Gaze tracking configuration.
///
/// The thresholds are empirical values inherited from field tuning; they
/// are exposed here rather than re-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazeConfig {
    /// Eye-Aspect-Ratio blink threshold.
    ///
    /// Note the EAR formula used here has a theoretical floor of 0.5, so
    /// deployments that want live blink counting must raise this above
    /// that floor (a fully closed eye sits at exactly 0.5).
    pub ear_threshold: f64,

    /// Frames of the EAR dip-and-recover rule (dip spans `n - 1` frames)
    pub blink_consecutive_frames: usize,

    /// Normalized eye-offset threshold for `screen`; `away` at twice this
    pub gaze_offset_threshold: f64,

    /// Normalized face-center offset threshold for the coarse variant
    pub coarse_offset_threshold: f64,

    /// Number of recent positions used for the stability estimate
    pub stability_window: usize,

    /// Positions required before stability is reported
    pub min_stability_samples: usize,

    /// Stability reported while under-sampled
    pub neutral_stability: f64,

    /// Variance-to-stability scale for normalized landmark coordinates
    pub landmark_stability_scale: f64,

    /// Variance-to-stability scale for pixel face-center coordinates
    pub coarse_stability_scale: f64,

    /// Sliding window for the blink-rate estimate (seconds)
    pub blink_window_secs: f64,

    /// Elapsed session time required before a blink rate is reported
    pub min_blink_elapsed_secs: f64,

    /// EAR history length (frames)
    pub ear_history: usize,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.25,
            blink_consecutive_frames: 2,
            gaze_offset_threshold: 0.15,
            coarse_offset_threshold: 0.2,
            stability_window: 30,
            min_stability_samples: 5,
            neutral_stability: 50.0,
            landmark_stability_scale: 1000.0,
            coarse_stability_scale: 0.01,
            blink_window_secs: 60.0,
            min_blink_elapsed_secs: 5.0,
            ear_history: 30,
        }
    }
}
