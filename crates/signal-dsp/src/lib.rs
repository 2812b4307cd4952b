//! Signal Processing Primitives
//!
//! Provides the frequency-domain pipeline used for remote
//! photoplethysmography: linear detrending, Butterworth bandpass
//! filtering, FFT peak detection, and the statistics/median helpers the
//! monitors build on.

mod fft;
mod filter;
mod statistics;

pub use fft::SpectrumAnalyzer;
pub use filter::{bandpass, detrend};
pub use statistics::{RollingMedian, SignalStats};

use thiserror::Error;

/// Signal processing error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Band [{low}, {high}] Hz is invalid for Nyquist frequency {nyquist} Hz")]
    InvalidBand { low: f64, high: f64, nyquist: f64 },

    #[error("Signal too short: {len} samples")]
    TooShort { len: usize },
}
