//! Bounded FIFO Windows
//!
//! Provides the rolling storage used by every per-session history in the
//! pipeline: raw rPPG samples, gaze classifications, blink rates, and the
//! per-frame metric log. Capacity is fixed at construction; pushing into a
//! full window evicts the oldest entry.

mod window;

pub use window::Window;

use serde::{Deserialize, Serialize};

/// One scalar observation with its capture time (seconds since epoch)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSample {
    pub value: f64,
    pub timestamp: f64,
}

/// Window of timestamped scalar samples
pub type SignalWindow = Window<SignalSample>;

impl SignalWindow {
    /// Sample values, oldest first
    pub fn values(&self) -> Vec<f64> {
        self.iter().map(|s| s.value).collect()
    }

    /// Fill ratio (0.0 to 1.0)
    pub fn fill_ratio(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    /// Seconds spanned by the buffered samples
    pub fn span_seconds(&self) -> f64 {
        match (self.front(), self.back()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }
}
