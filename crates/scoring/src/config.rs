//! Scoring configuration

use serde::{Deserialize, Serialize};

/// Scoring configuration.
///
/// These are the empirical constants of the scoring model; they are
/// preserved as configuration rather than re-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Heart-rate range whose midpoint scores the highest focus (BPM)
    pub focus_hr_range: (f64, f64),

    /// Breathing std-dev below which breathing counts as stable (BPM)
    pub breathing_stability_threshold: f64,

    /// Heart-rate range rewarded most by engagement (BPM)
    pub engagement_hr_range: (f64, f64),

    /// Breathing-rate range rewarded most by engagement (BPM)
    pub engagement_br_range: (f64, f64),

    /// Blink-rate band treated as normal (blinks/min)
    pub normal_blink_range: (f64, f64),

    /// Breathing rate below which thinking is rewarded (BPM)
    pub thinking_breathing_slow_threshold: f64,

    /// Most-rewarded heart-rate rise above baseline (BPM)
    pub thinking_hr_increase: (f64, f64),

    /// Samples that establish a channel baseline
    pub baseline_samples: usize,

    /// Rolling history lengths
    pub vitals_history: usize,
    pub attention_history: usize,
    pub metrics_history: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            focus_hr_range: (60.0, 100.0),
            breathing_stability_threshold: 2.0,
            engagement_hr_range: (70.0, 90.0),
            engagement_br_range: (12.0, 18.0),
            normal_blink_range: (12.0, 25.0),
            thinking_breathing_slow_threshold: 12.0,
            thinking_hr_increase: (5.0, 10.0),
            baseline_samples: 5,
            vitals_history: 30,
            attention_history: 100,
            metrics_history: 100,
        }
    }
}
