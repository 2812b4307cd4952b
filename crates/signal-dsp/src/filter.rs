//! Detrending and Butterworth bandpass filtering

use crate::DspError;

/// Remove the least-squares linear trend from a signal.
///
/// Strips the DC offset and slow drift (lighting changes, subject
/// movement) before bandpass filtering.
pub fn detrend(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n < 2 {
        return signal.iter().map(|_| 0.0).collect();
    }

    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = signal.iter().sum::<f64>() / n_f;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in signal.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }

    let slope = if den > 0.0 { num / den } else { 0.0 };
    signal
        .iter()
        .enumerate()
        .map(|(i, &y)| y - (y_mean + slope * (i as f64 - x_mean)))
        .collect()
}

/// Q of a 2nd-order Butterworth section
const BUTTERWORTH_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// One second-order IIR section (transposed direct form II)
#[derive(Debug, Clone, Copy)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Biquad {
    /// Butterworth low-pass section at `cutoff_hz`
    fn lowpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        let w0 = 2.0 * std::f64::consts::PI * cutoff_hz / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * BUTTERWORTH_Q);
        let a0 = 1.0 + alpha;
        Self {
            b0: ((1.0 - cos_w0) / 2.0) / a0,
            b1: (1.0 - cos_w0) / a0,
            b2: ((1.0 - cos_w0) / 2.0) / a0,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// Butterworth high-pass section at `cutoff_hz`
    fn highpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        let w0 = 2.0 * std::f64::consts::PI * cutoff_hz / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * BUTTERWORTH_Q);
        let a0 = 1.0 + alpha;
        Self {
            b0: ((1.0 + cos_w0) / 2.0) / a0,
            b1: (-(1.0 + cos_w0)) / a0,
            b2: ((1.0 + cos_w0) / 2.0) / a0,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// Run the section over a signal in place
    fn apply(&self, signal: &mut [f64]) {
        let mut z1 = 0.0;
        let mut z2 = 0.0;
        for x in signal.iter_mut() {
            let y = self.b0 * *x + z1;
            z1 = self.b1 * *x - self.a1 * y + z2;
            z2 = self.b2 * *x - self.a2 * y;
            *x = y;
        }
    }
}

/// 4th-order Butterworth bandpass, zero-phase.
///
/// Built as a cascaded high-pass (at `low_hz`) and low-pass (at `high_hz`)
/// section pair, applied forward and backward so the filter adds no phase
/// delay to the pulse waveform. Cutoffs must sit strictly inside the
/// Nyquist limit.
pub fn bandpass(
    signal: &[f64],
    sample_rate: f64,
    low_hz: f64,
    high_hz: f64,
) -> Result<Vec<f64>, DspError> {
    let nyquist = sample_rate / 2.0;
    if low_hz <= 0.0 || high_hz <= low_hz || high_hz >= nyquist {
        return Err(DspError::InvalidBand {
            low: low_hz,
            high: high_hz,
            nyquist,
        });
    }
    if signal.len() < 4 {
        return Err(DspError::TooShort { len: signal.len() });
    }

    let hp = Biquad::highpass(low_hz, sample_rate);
    let lp = Biquad::lowpass(high_hz, sample_rate);

    let mut filtered = signal.to_vec();

    // Forward pass
    hp.apply(&mut filtered);
    lp.apply(&mut filtered);

    // Backward pass cancels the phase shift of the forward pass
    filtered.reverse();
    hp.apply(&mut filtered);
    lp.apply(&mut filtered);
    filtered.reverse();

    Ok(filtered)
}
