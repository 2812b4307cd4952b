//! FFT-based dominant-frequency detection

use rustfft::{num_complex::Complex, FftPlanner};

/// Minimum zero-padding factor applied before the FFT.
///
/// Short windows (1-2 s of frames) have coarse native bin spacing; padding
/// interpolates the spectrum so the peak localizes to a few BPM.
const PAD_FACTOR: usize = 8;

/// Frequency-domain peak detector
pub struct SpectrumAnalyzer {
    /// FFT planner for efficient computation
    planner: FftPlanner<f64>,
    /// Sampling frequency (Hz)
    sample_rate: f64,
}

impl SpectrumAnalyzer {
    /// Create a new analyzer for the given sample rate
    pub fn new(sample_rate: f64) -> Self {
        Self {
            planner: FftPlanner::new(),
            sample_rate,
        }
    }

    /// Apply a Hamming window to reduce spectral leakage
    fn apply_hamming_window(signal: &mut [f64]) {
        let n = signal.len();
        if n < 2 {
            return;
        }
        for (i, v) in signal.iter_mut().enumerate() {
            let window =
                0.54 - 0.46 * (2.0 * std::f64::consts::PI * i as f64 / (n - 1) as f64).cos();
            *v *= window;
        }
    }

    /// Frequency of the maximum-magnitude bin within `band` (Hz, inclusive).
    ///
    /// Returns `None` when the signal is empty, the band holds no bins, or
    /// the in-band spectrum is flat zero.
    pub fn dominant_frequency(&mut self, signal: &[f64], band: (f64, f64)) -> Option<f64> {
        if signal.is_empty() {
            return None;
        }

        let n = signal.len();
        let padded_len = (n * PAD_FACTOR).next_power_of_two();

        let mut windowed = signal.to_vec();
        Self::apply_hamming_window(&mut windowed);

        let mut buffer: Vec<Complex<f64>> = windowed
            .into_iter()
            .map(|v| Complex::new(v, 0.0))
            .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
            .take(padded_len)
            .collect();

        let fft = self.planner.plan_fft_forward(padded_len);
        fft.process(&mut buffer);

        let freq_resolution = self.sample_rate / padded_len as f64;

        let mut peak_freq = None;
        let mut peak_magnitude = 0.0;
        for (i, c) in buffer.iter().take(padded_len / 2).enumerate() {
            let freq = i as f64 * freq_resolution;
            if freq < band.0 || freq > band.1 {
                continue;
            }
            let magnitude = c.norm();
            if magnitude > peak_magnitude {
                peak_magnitude = magnitude;
                peak_freq = Some(freq);
            }
        }

        peak_freq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq_hz * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_peak_of_pulse_tone() {
        let mut analyzer = SpectrumAnalyzer::new(30.0);
        // 1.25 Hz = 75 BPM, two seconds of frames
        let signal = sine(1.25, 30.0, 60);
        let freq = analyzer.dominant_frequency(&signal, (0.7, 4.0)).unwrap();
        assert!((freq * 60.0 - 75.0).abs() < 5.0, "got {} BPM", freq * 60.0);
    }

    #[test]
    fn test_peak_restricted_to_band() {
        let mut analyzer = SpectrumAnalyzer::new(30.0);
        // Strong 0.3 Hz tone plus a weaker 1.5 Hz tone
        let signal: Vec<f64> = sine(0.3, 30.0, 300)
            .iter()
            .zip(sine(1.5, 30.0, 300))
            .map(|(a, b)| 3.0 * a + b)
            .collect();

        let in_heart_band = analyzer.dominant_frequency(&signal, (0.7, 4.0)).unwrap();
        assert!((in_heart_band - 1.5).abs() < 0.1);

        let in_breath_band = analyzer.dominant_frequency(&signal, (0.1, 0.5)).unwrap();
        assert!((in_breath_band - 0.3).abs() < 0.05);
    }

    #[test]
    fn test_empty_signal() {
        let mut analyzer = SpectrumAnalyzer::new(30.0);
        assert!(analyzer.dominant_frequency(&[], (0.7, 4.0)).is_none());
    }

    #[test]
    fn test_band_with_no_bins() {
        let mut analyzer = SpectrumAnalyzer::new(30.0);
        let signal = sine(1.0, 30.0, 64);
        // Band entirely above Nyquist holds no bins
        assert!(analyzer.dominant_frequency(&signal, (20.0, 25.0)).is_none());
    }
}
