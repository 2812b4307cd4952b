//! Vitals Records and Source Fallback
//!
//! Produces one [`VitalsRecord`] per frame. The [`MetricsCombiner`] runs
//! the rPPG monitor and the active gaze tracker on the same frame; the
//! [`FallbackChain`] degrades to a vendor subprocess and finally to a
//! simulated placeholder when measurement fails. Every record is tagged
//! with its source so consumers can always tell measured data from
//! placeholders.

mod chain;
mod combiner;
mod vendor;

pub use chain::FallbackChain;
pub use combiner::{overall_quality, MetricsCombiner};
pub use vendor::{VendorBridge, VendorConfig, VendorError, VendorVitals};

use gaze::GazeDirection;
use serde::{Deserialize, Serialize};

/// Where a record's vitals came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsSource {
    /// Measured by the in-process rPPG + gaze pipeline
    Custom,
    /// Measured by the vendor subprocess
    Vendor,
    /// Synthesized placeholder; not a measurement
    Simulated,
}

/// One frame's merged vitals. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalsRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breathing_rate: Option<f64>,
    /// rPPG signal quality 0-100
    pub signal_quality: f64,
    pub gaze_direction: GazeDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blink_rate: Option<f64>,
    /// Eye-movement stability 0-100
    pub eye_movement_stability: f64,
    /// Current on-screen focus run (seconds)
    pub focus_duration: f64,
    /// Whether a face was found in this frame
    pub face_detected: bool,
    /// Composite quality 0-100 across contributing signals
    pub overall_quality: f64,
    pub source: MetricsSource,
}

impl VitalsRecord {
    /// Record with every field at its explicit default
    pub fn empty(source: MetricsSource) -> Self {
        Self {
            heart_rate: None,
            breathing_rate: None,
            signal_quality: 0.0,
            gaze_direction: GazeDirection::Unknown,
            blink_rate: None,
            eye_movement_stability: 0.0,
            focus_duration: 0.0,
            face_detected: false,
            overall_quality: 0.0,
            source,
        }
    }

    /// Whether at least one vital sign was measured
    pub fn has_vitals(&self) -> bool {
        self.heart_rate.is_some() || self.breathing_rate.is_some()
    }
}
