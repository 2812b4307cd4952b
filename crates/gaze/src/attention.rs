//! Shared attention state: position stability, blink bookkeeping, and the
//! on-screen focus run

use crate::GazeConfig;
use signal_buffer::Window;
use std::collections::VecDeque;

/// Per-session attention state shared by both tracker variants
#[derive(Debug)]
pub(crate) struct AttentionState {
    /// Recent eye/face-center positions
    positions: Window<(f64, f64)>,
    /// Timestamps of detected blinks (pruned to the rate window)
    blink_times: VecDeque<f64>,
    /// First frame timestamp seen this session
    first_frame: Option<f64>,
    /// Previous frame timestamp
    last_frame: Option<f64>,
    /// Seconds of the current consecutive on-screen run
    focus_run_secs: f64,
    /// Whether the previous frame classified as on-screen
    prev_on_screen: bool,
}

impl AttentionState {
    pub fn new(config: &GazeConfig) -> Self {
        Self {
            positions: Window::new(config.stability_window),
            blink_times: VecDeque::new(),
            first_frame: None,
            last_frame: None,
            focus_run_secs: 0.0,
            prev_on_screen: false,
        }
    }

    /// Record an eye/face-center position for the stability estimate
    pub fn observe_position(&mut self, x: f64, y: f64) {
        self.positions.push((x, y));
    }

    /// Eye-movement stability 0-100: inverse of recent position variance.
    ///
    /// `scale` converts the coordinate-space variance onto the 0-100
    /// scale (different for normalized landmark vs. pixel coordinates).
    pub fn stability(&self, scale: f64, config: &GazeConfig) -> f64 {
        if self.positions.len() < config.min_stability_samples {
            return config.neutral_stability;
        }

        let n = self.positions.len() as f64;
        let (sum_x, sum_y) = self
            .positions
            .iter()
            .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
        let (mean_x, mean_y) = (sum_x / n, sum_y / n);

        let total_variance = self
            .positions
            .iter()
            .map(|(x, y)| (x - mean_x).powi(2) + (y - mean_y).powi(2))
            .sum::<f64>()
            / n;

        (100.0 - total_variance * scale).clamp(0.0, 100.0)
    }

    /// Record a detected blink
    pub fn record_blink(&mut self, timestamp: f64, config: &GazeConfig) {
        self.blink_times.push_back(timestamp);
        let cutoff = timestamp - config.blink_window_secs;
        while let Some(&front) = self.blink_times.front() {
            if front < cutoff {
                self.blink_times.pop_front();
            } else {
                break;
            }
        }
    }

    /// Blinks per minute over the recent window.
    ///
    /// Reported only after enough session time has elapsed and at least
    /// one blink has been observed.
    pub fn blink_rate(&self, now: f64, config: &GazeConfig) -> Option<f64> {
        let first = self.first_frame?;
        let elapsed = now - first;
        if elapsed < config.min_blink_elapsed_secs {
            return None;
        }

        let window_secs = elapsed.min(config.blink_window_secs);
        let cutoff = now - window_secs;
        let count = self.blink_times.iter().filter(|&&t| t >= cutoff).count();
        if count == 0 {
            return None;
        }

        Some(count as f64 / window_secs * 60.0)
    }

    /// Advance the focus run with this frame's classification.
    ///
    /// A non-on-screen frame RESETS the run; the next on-screen frame
    /// starts over from its own time delta.
    pub fn update_focus(&mut self, on_screen: bool, timestamp: f64) -> f64 {
        if self.first_frame.is_none() {
            self.first_frame = Some(timestamp);
        }
        let delta = self
            .last_frame
            .map(|last| (timestamp - last).max(0.0))
            .unwrap_or(0.0);
        self.last_frame = Some(timestamp);

        if on_screen {
            if self.prev_on_screen {
                self.focus_run_secs += delta;
            } else {
                self.focus_run_secs = delta;
            }
        } else {
            self.focus_run_secs = 0.0;
        }
        self.prev_on_screen = on_screen;

        self.focus_run_secs
    }

    pub fn reset(&mut self) {
        self.positions.clear();
        self.blink_times.clear();
        self.first_frame = None;
        self.last_frame = None;
        self.focus_run_secs = 0.0;
        self.prev_on_screen = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_run_resets_on_interruption() {
        let config = GazeConfig::default();
        let mut state = AttentionState::new(&config);

        // screen, screen, away, screen at 1 fps
        assert_eq!(state.update_focus(true, 0.0), 0.0);
        assert!((state.update_focus(true, 1.0) - 1.0).abs() < 1e-9);
        assert_eq!(state.update_focus(false, 2.0), 0.0);
        let resumed = state.update_focus(true, 3.0);
        // Run restarts from the current frame's delta, not 2.0 + delta
        assert!((resumed - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_focus_run_accumulates_while_on_screen() {
        let config = GazeConfig::default();
        let mut state = AttentionState::new(&config);
        let mut run = 0.0;
        for i in 0..90 {
            run = state.update_focus(true, i as f64 / 30.0);
        }
        assert!((run - 89.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_stability_neutral_until_sampled() {
        let config = GazeConfig::default();
        let mut state = AttentionState::new(&config);
        assert_eq!(state.stability(1000.0, &config), 50.0);

        for _ in 0..10 {
            state.observe_position(0.5, 0.5);
        }
        // Perfectly still positions: full stability
        assert!((state.stability(1000.0, &config) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_stability_drops_with_jitter() {
        let config = GazeConfig::default();
        let mut state = AttentionState::new(&config);
        for i in 0..30 {
            let jitter = if i % 2 == 0 { 0.2 } else { -0.2 };
            state.observe_position(0.5 + jitter, 0.5);
        }
        assert!(state.stability(1000.0, &config) < 70.0);
    }

    #[test]
    fn test_blink_rate_gating() {
        let config = GazeConfig::default();
        let mut state = AttentionState::new(&config);

        state.update_focus(true, 0.0);
        state.record_blink(1.0, &config);
        // Too early
        assert!(state.blink_rate(3.0, &config).is_none());

        state.update_focus(true, 10.0);
        let rate = state.blink_rate(10.0, &config).unwrap();
        // One blink over ten seconds = 6/min
        assert!((rate - 6.0).abs() < 0.1);
    }

    #[test]
    fn test_blink_rate_requires_a_blink() {
        let config = GazeConfig::default();
        let mut state = AttentionState::new(&config);
        state.update_focus(true, 0.0);
        state.update_focus(true, 20.0);
        assert!(state.blink_rate(20.0, &config).is_none());
    }
}
