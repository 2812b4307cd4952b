//! Source fallback chain

use crate::{MetricsCombiner, MetricsSource, VendorBridge, VendorVitals, VitalsRecord};
use rand::Rng;
use tracing::{debug, warn};
use video_frame::VideoFrame;

/// Simulated placeholder ranges (BPM)
const SIMULATED_HR_RANGE: (f64, f64) = (65.0, 85.0);
const SIMULATED_BR_RANGE: (f64, f64) = (14.0, 18.0);

/// Tiered vitals source: custom pipeline, then the vendor subprocess,
/// then a simulated placeholder. Every returned record carries its
/// source tag; placeholder data is never mistakable for a measurement.
pub struct FallbackChain {
    combiner: MetricsCombiner,
    vendor: Option<VendorBridge>,
    api_key: String,
}

impl FallbackChain {
    pub fn new(combiner: MetricsCombiner, vendor: Option<VendorBridge>, api_key: String) -> Self {
        Self {
            combiner,
            vendor,
            api_key,
        }
    }

    /// Produce a record for this frame, degrading through the tiers.
    ///
    /// The custom tier is accepted when it measured at least one vital
    /// sign; the vendor tier requires both.
    pub async fn next_record(&mut self, frame: &VideoFrame, timestamp: f64) -> VitalsRecord {
        let record = self.combiner.process(frame, timestamp);
        if record.has_vitals() {
            return record;
        }

        if let Some(vendor) = &self.vendor {
            match vendor.read_vitals(frame, &self.api_key).await {
                Ok(vitals) => {
                    debug!("vendor fallback supplied vitals");
                    return Self::vendor_record(vitals);
                }
                Err(e) => warn!("vendor fallback failed: {}", e),
            }
        }

        Self::simulated_record()
    }

    /// Reset the embedded extractors
    pub fn reset(&mut self) {
        self.combiner.reset();
    }

    fn vendor_record(vitals: VendorVitals) -> VitalsRecord {
        let mut record = VitalsRecord::empty(MetricsSource::Vendor);
        record.heart_rate = Some(vitals.heart_rate);
        record.breathing_rate = Some(vitals.breathing_rate);
        record
    }

    fn simulated_record() -> VitalsRecord {
        let mut rng = rand::thread_rng();
        let mut record = VitalsRecord::empty(MetricsSource::Simulated);
        record.heart_rate = Some(rng.gen_range(SIMULATED_HR_RANGE.0..=SIMULATED_HR_RANGE.1));
        record.breathing_rate = Some(rng.gen_range(SIMULATED_BR_RANGE.0..=SIMULATED_BR_RANGE.1));
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaze::{select_tracker, GazeConfig, GazeDirection};
    use rppg::{HeartRateMonitor, RppgConfig};
    use vision::{FaceDetector, VisionConfig};

    fn chain_without_vendor() -> FallbackChain {
        let vision = VisionConfig::default();
        let monitor = HeartRateMonitor::new(RppgConfig::default(), FaceDetector::new(&vision));
        let tracker = select_tracker(&vision, GazeConfig::default());
        FallbackChain::new(MetricsCombiner::new(monitor, tracker), None, "key".into())
    }

    #[tokio::test]
    async fn test_exhausted_chain_simulates() {
        let mut chain = chain_without_vendor();
        // Dark frame: no face, no vitals, no vendor configured
        let frame = VideoFrame::new(vec![0u8; 320 * 240 * 3], 320, 240, 0.0).unwrap();

        let record = chain.next_record(&frame, 0.0).await;
        assert_eq!(record.source, MetricsSource::Simulated);

        let hr = record.heart_rate.unwrap();
        let br = record.breathing_rate.unwrap();
        assert!((65.0..=85.0).contains(&hr));
        assert!((14.0..=18.0).contains(&br));

        // Placeholder carries defaults for everything unmeasured
        assert_eq!(record.gaze_direction, GazeDirection::Unknown);
        assert!(record.blink_rate.is_none());
        assert!(!record.face_detected);
    }

    #[tokio::test]
    async fn test_simulated_records_are_tagged() {
        // Two placeholder records never masquerade as measurements
        let a = FallbackChain::simulated_record();
        let b = FallbackChain::simulated_record();
        assert_eq!(a.source, MetricsSource::Simulated);
        assert_eq!(b.source, MetricsSource::Simulated);
    }

    #[tokio::test]
    async fn test_vendor_record_shape() {
        let record = FallbackChain::vendor_record(VendorVitals {
            heart_rate: 71.0,
            breathing_rate: 16.0,
        });
        assert_eq!(record.source, MetricsSource::Vendor);
        assert_eq!(record.heart_rate, Some(71.0));
        assert_eq!(record.breathing_rate, Some(16.0));
        assert_eq!(record.eye_movement_stability, 0.0);
        assert_eq!(record.focus_duration, 0.0);
    }
}
