//! Heart-rate monitor

use crate::RppgConfig;
use serde::{Deserialize, Serialize};
use signal_buffer::{SignalSample, SignalWindow};
use signal_dsp::{bandpass, detrend, RollingMedian, SignalStats, SpectrumAnalyzer};
use tracing::debug;
use video_frame::VideoFrame;
use vision::{FaceBox, FaceDetector};

/// Forehead region of interest, pixel space.
///
/// Owned by exactly one monitor; recomputed whenever the face is
/// re-detected or extraction fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Per-frame vitals output; absent fields mean "no reading yet"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalsReading {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breathing_rate: Option<f64>,
    /// Signal quality 0-100
    pub signal_quality: f64,
    /// Fraction of the signal buffer currently filled
    pub buffer_fill: f64,
}

/// rPPG heart/breathing-rate monitor for one session
pub struct HeartRateMonitor {
    config: RppgConfig,
    detector: FaceDetector,
    spectrum: SpectrumAnalyzer,
    roi: Option<Roi>,
    signal: SignalWindow,
    hr_median: RollingMedian,
    br_median: RollingMedian,
    signal_quality: f64,
}

impl HeartRateMonitor {
    pub fn new(config: RppgConfig, detector: FaceDetector) -> Self {
        Self {
            spectrum: SpectrumAnalyzer::new(config.fps),
            signal: SignalWindow::new(config.buffer_capacity()),
            hr_median: RollingMedian::new(config.median_window),
            br_median: RollingMedian::new(config.median_window),
            signal_quality: 0.0,
            roi: None,
            config,
            detector,
        }
    }

    /// Process one frame; `None` when no face/ROI is available.
    ///
    /// Numeric failures inside the pipeline are local: the affected field
    /// comes back absent and the monitor keeps buffering.
    pub fn process_frame(&mut self, frame: &VideoFrame, timestamp: f64) -> Option<VitalsReading> {
        if self.roi.is_none() {
            self.roi = self.initialize_roi(frame);
            self.roi?;
        }

        let value = match self.extract_signal(frame) {
            Some(v) => v,
            None => {
                // ROI no longer maps onto the frame; re-detect once
                self.roi = self.initialize_roi(frame);
                self.roi?;
                self.extract_signal(frame)?
            }
        };

        self.signal.push(SignalSample { value, timestamp });

        if self.signal.len() < self.config.min_hr_samples() {
            return Some(VitalsReading {
                heart_rate: None,
                breathing_rate: None,
                signal_quality: 0.0,
                buffer_fill: self.signal.fill_ratio(),
            });
        }

        let values = self.signal.values();

        let heart_rate = self
            .estimate_rate(&values, self.config.hr_band, self.config.hr_limits)
            .map(|raw| self.hr_median.push(raw));

        let breathing_rate = if self.signal.len() >= self.config.min_br_samples() {
            self.estimate_rate(&values, self.config.br_band, self.config.br_limits)
                .map(|raw| self.br_median.push(raw))
        } else {
            None
        };

        self.signal_quality = if values.len() >= self.config.min_quality_samples {
            (SignalStats::compute(&values).variance * 100.0).min(100.0)
        } else {
            0.0
        };

        Some(VitalsReading {
            heart_rate,
            breathing_rate,
            signal_quality: self.signal_quality,
            buffer_fill: self.signal.fill_ratio(),
        })
    }

    /// Detect the largest face and derive the forehead ROI
    fn initialize_roi(&self, frame: &VideoFrame) -> Option<Roi> {
        let face = self.detector.detect(frame)?;
        self.forehead_roi(&face, frame)
    }

    /// Horizontally-centered 60%-wide, top 25%-tall sub-rectangle of the
    /// face box, clamped to the frame
    fn forehead_roi(&self, face: &FaceBox, frame: &VideoFrame) -> Option<Roi> {
        let x = (face.x + face.width * self.config.roi_x_margin).max(0.0) as u32;
        let y = (face.y + face.height * self.config.roi_y_margin).max(0.0) as u32;
        let width = ((face.width * self.config.roi_width_frac) as u32).min(frame.width.saturating_sub(x));
        let height =
            ((face.height * self.config.roi_height_frac) as u32).min(frame.height.saturating_sub(y));

        if width < self.config.min_roi_width || height < self.config.min_roi_height {
            debug!(width, height, "forehead ROI below minimum size");
            return None;
        }

        Some(Roi {
            x,
            y,
            width,
            height,
        })
    }

    /// Mean green over the ROI; green carries the strongest
    /// blood-volume-pulse component
    fn extract_signal(&self, frame: &VideoFrame) -> Option<f64> {
        let roi = self.roi?;
        frame.mean_green(roi.x, roi.y, roi.width, roi.height)
    }

    /// Detrend, bandpass, and locate the spectral peak; `None` outside
    /// the accepted BPM range or on any filter failure
    fn estimate_rate(
        &mut self,
        values: &[f64],
        band: (f64, f64),
        limits: (f64, f64),
    ) -> Option<f64> {
        let detrended = detrend(values);
        let filtered = bandpass(&detrended, self.config.fps, band.0, band.1).ok()?;
        let peak_hz = self.spectrum.dominant_frequency(&filtered, band)?;

        let bpm = peak_hz * 60.0;
        (bpm >= limits.0 && bpm <= limits.1).then_some(bpm)
    }

    /// Current ROI, when established
    pub fn roi(&self) -> Option<Roi> {
        self.roi
    }

    /// Clear buffers, smoothing history, and the ROI
    pub fn reset(&mut self) {
        self.signal.clear();
        self.hr_median.clear();
        self.br_median.clear();
        self.roi = None;
        self.signal_quality = 0.0;
    }
}
