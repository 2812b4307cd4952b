//! Statistics and median smoothing

use std::collections::VecDeque;

/// Summary statistics for a signal
#[derive(Debug, Clone, Default)]
pub struct SignalStats {
    /// Mean value
    pub mean: f64,
    /// Population variance
    pub variance: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
}

impl SignalStats {
    /// Compute statistics from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

        Self {
            mean,
            variance,
            std_dev: variance.sqrt(),
            min,
            max,
        }
    }
}

/// Median over the last N accepted readings.
///
/// Smooths per-frame rate estimates against single-frame outliers. Unlike
/// a fixed-stride filter this only ever holds readings the caller deemed
/// valid, so a run of rejected frames does not dilute the median.
#[derive(Debug, Clone)]
pub struct RollingMedian {
    window: VecDeque<f64>,
    capacity: usize,
}

impl RollingMedian {
    /// Create a rolling median over the last `capacity` readings
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "median window must be > 0");
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Accept a reading and return the median of the current window
    pub fn push(&mut self, value: f64) -> f64 {
        if self.window.len() >= self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(value);

        let mut sorted: Vec<f64> = self.window.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            sorted[mid]
        } else {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        }
    }

    /// Number of buffered readings
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Check if no readings have been accepted yet
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Drop all buffered readings
    pub fn clear(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_basic() {
        let stats = SignalStats::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stats.mean - 5.0).abs() < 1e-9);
        assert!((stats.std_dev - 2.0).abs() < 1e-9);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn test_stats_empty() {
        let stats = SignalStats::compute(&[]);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.variance, 0.0);
    }

    #[test]
    fn test_median_resists_outlier() {
        let mut median = RollingMedian::new(10);
        for v in [72.0, 71.0, 73.0, 72.0] {
            median.push(v);
        }
        let smoothed = median.push(190.0);
        assert!((smoothed - 72.0).abs() < 1.0);
    }

    #[test]
    fn test_median_window_slides() {
        let mut median = RollingMedian::new(3);
        median.push(1.0);
        median.push(2.0);
        median.push(3.0);
        // 1.0 evicted; window is [2, 3, 100]
        let smoothed = median.push(100.0);
        assert!((smoothed - 3.0).abs() < 1e-9);
        assert_eq!(median.len(), 3);
    }

    #[test]
    fn test_even_window_averages_middle_pair() {
        let mut median = RollingMedian::new(10);
        median.push(10.0);
        let smoothed = median.push(20.0);
        assert!((smoothed - 15.0).abs() < 1e-9);
    }
}
