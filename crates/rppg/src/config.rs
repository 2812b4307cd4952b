//! rPPG configuration

use serde::{Deserialize, Serialize};

/// rPPG configuration.
///
/// Band edges and acceptance ranges are the established empirical values
/// for camera-based pulse extraction; they are configuration, not derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RppgConfig {
    /// Expected frame rate (Hz)
    pub fps: f64,

    /// Signal buffer length (seconds)
    pub buffer_secs: f64,

    /// Heart-rate bandpass edges (Hz); 0.7-4.0 covers 42-240 BPM
    pub hr_band: (f64, f64),

    /// Breathing-rate bandpass edges (Hz); 0.1-0.5 covers 6-30 BPM
    pub br_band: (f64, f64),

    /// Accepted heart-rate range (BPM)
    pub hr_limits: (f64, f64),

    /// Accepted breathing-rate range (BPM)
    pub br_limits: (f64, f64),

    /// Buffered seconds required before a heart-rate estimate
    pub min_hr_secs: f64,

    /// Buffered seconds required before a breathing-rate estimate
    pub min_br_secs: f64,

    /// Rolling-median window over valid readings
    pub median_window: usize,

    /// Samples required before signal quality is reported
    pub min_quality_samples: usize,

    /// Forehead ROI geometry relative to the face box
    pub roi_x_margin: f32,
    pub roi_y_margin: f32,
    pub roi_width_frac: f32,
    pub roi_height_frac: f32,

    /// Minimum usable ROI size (pixels)
    pub min_roi_width: u32,
    pub min_roi_height: u32,
}

impl Default for RppgConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            buffer_secs: 30.0,
            hr_band: (0.7, 4.0),
            br_band: (0.1, 0.5),
            hr_limits: (40.0, 200.0),
            br_limits: (6.0, 30.0),
            min_hr_secs: 1.0,
            min_br_secs: 2.0,
            median_window: 10,
            min_quality_samples: 10,
            roi_x_margin: 0.2,
            roi_y_margin: 0.1,
            roi_width_frac: 0.6,
            roi_height_frac: 0.25,
            min_roi_width: 50,
            min_roi_height: 20,
        }
    }
}

impl RppgConfig {
    /// Buffer capacity in samples
    pub fn buffer_capacity(&self) -> usize {
        (self.fps * self.buffer_secs).round().max(1.0) as usize
    }

    /// Samples required before a heart-rate estimate
    pub fn min_hr_samples(&self) -> usize {
        (self.fps * self.min_hr_secs).round().max(1.0) as usize
    }

    /// Samples required before a breathing-rate estimate
    pub fn min_br_samples(&self) -> usize {
        (self.fps * self.min_br_secs).round().max(1.0) as usize
    }
}
