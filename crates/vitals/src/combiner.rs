//! Metrics combining

use crate::{MetricsSource, VitalsRecord};
use gaze::{GazeDirection, GazeTracker};
use rppg::HeartRateMonitor;
use video_frame::VideoFrame;

/// Runs the rPPG monitor and the gaze tracker on the same frame and
/// merges their partial results into one record
pub struct MetricsCombiner {
    monitor: HeartRateMonitor,
    tracker: Box<dyn GazeTracker>,
}

impl MetricsCombiner {
    pub fn new(monitor: HeartRateMonitor, tracker: Box<dyn GazeTracker>) -> Self {
        Self { monitor, tracker }
    }

    /// Process one frame into a merged record.
    ///
    /// Each extractor contributes independently; a missing contribution
    /// leaves its fields at their explicit defaults.
    pub fn process(&mut self, frame: &VideoFrame, timestamp: f64) -> VitalsRecord {
        let mut record = VitalsRecord::empty(MetricsSource::Custom);

        if let Some(vitals) = self.monitor.process_frame(frame, timestamp) {
            record.heart_rate = vitals.heart_rate;
            record.breathing_rate = vitals.breathing_rate;
            record.signal_quality = vitals.signal_quality;
        }

        let gaze = self.tracker.process_frame(frame, timestamp);
        record.gaze_direction = gaze.gaze_direction;
        record.blink_rate = gaze.blink_rate;
        record.eye_movement_stability = gaze.eye_movement_stability;
        record.focus_duration = gaze.focus_duration;
        record.face_detected = gaze.face_detected;

        record.overall_quality = overall_quality(&record);
        record
    }

    /// Reset both extractors
    pub fn reset(&mut self) {
        self.monitor.reset();
        self.tracker.reset();
    }
}

/// Composite quality over the signals that actually contributed.
///
/// Vitals quality weighs 0.4 (only with a heart-rate reading), eye
/// stability 0.3 (only with a detected face), and a flat 30 points for a
/// resolved gaze direction; the sum is renormalized by the weights that
/// participated.
pub fn overall_quality(record: &VitalsRecord) -> f64 {
    let mut quality = 0.0;
    let mut factors = 0.0;

    if record.heart_rate.is_some() {
        quality += record.signal_quality * 0.4;
        factors += 0.4;
    }

    if record.face_detected {
        quality += record.eye_movement_stability * 0.3;
        factors += 0.3;
    }

    if record.gaze_direction != GazeDirection::Unknown {
        quality += 30.0;
        factors += 0.3;
    }

    if factors > 0.0 {
        quality /= factors;
    }

    quality.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MetricsSource;

    fn record() -> VitalsRecord {
        VitalsRecord::empty(MetricsSource::Custom)
    }

    #[test]
    fn test_quality_zero_when_nothing_contributes() {
        assert_eq!(overall_quality(&record()), 0.0);
    }

    #[test]
    fn test_quality_from_vitals_only() {
        let mut r = record();
        r.heart_rate = Some(72.0);
        r.signal_quality = 80.0;
        // Single 0.4-weight contribution renormalizes back to its value
        assert!((overall_quality(&r) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_quality_blends_all_contributions() {
        let mut r = record();
        r.heart_rate = Some(72.0);
        r.signal_quality = 80.0;
        r.face_detected = true;
        r.eye_movement_stability = 90.0;
        r.gaze_direction = GazeDirection::Screen;

        // (80*0.4 + 90*0.3 + 30) / (0.4 + 0.3 + 0.3) = 89
        assert!((overall_quality(&r) - 89.0).abs() < 1e-9);
    }

    #[test]
    fn test_quality_clamped() {
        let mut r = record();
        r.gaze_direction = GazeDirection::Away;
        // 30 / 0.3 = 100, the flat gaze contribution alone saturates
        assert_eq!(overall_quality(&r), 100.0);
    }
}
