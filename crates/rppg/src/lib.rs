//! Remote Photoplethysmography (rPPG)
//!
//! Estimates heart rate and breathing rate from subtle color changes in
//! facial video. The monitor samples the mean green channel over a
//! forehead region and runs a detrend, bandpass, FFT-peak pipeline on
//! the buffered signal.

mod config;
mod monitor;

pub use config::RppgConfig;
pub use monitor::{HeartRateMonitor, Roi, VitalsReading};
