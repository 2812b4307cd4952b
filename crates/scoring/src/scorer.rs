//! Per-session scorer

use crate::{AggregatedMetrics, Metric, ScoringConfig};
use chrono::{DateTime, Utc};
use gaze::GazeDirection;
use signal_buffer::Window;
use signal_dsp::SignalStats;
use tracing::debug;

/// Scoring engine for one session.
///
/// Created by `start`, fed by `add_metrics` while active, torn down by
/// `stop`. Holds bounded rolling histories and the once-only per-channel
/// baselines.
pub struct SessionScorer {
    config: ScoringConfig,
    session_id: String,
    start_time: DateTime<Utc>,
    heart_rates: Window<f64>,
    breathing_rates: Window<f64>,
    gaze_directions: Window<GazeDirection>,
    blink_rates: Window<f64>,
    stabilities: Window<f64>,
    focus_durations: Window<f64>,
    baseline_heart_rate: Option<f64>,
    baseline_breathing_rate: Option<f64>,
    frame_count: u64,
    history: Window<Metric>,
}

impl SessionScorer {
    pub fn new(session_id: String, config: ScoringConfig) -> Self {
        Self {
            heart_rates: Window::new(config.vitals_history),
            breathing_rates: Window::new(config.vitals_history),
            gaze_directions: Window::new(config.attention_history),
            blink_rates: Window::new(config.attention_history),
            stabilities: Window::new(config.attention_history),
            focus_durations: Window::new(config.attention_history),
            history: Window::new(config.metrics_history),
            baseline_heart_rate: None,
            baseline_breathing_rate: None,
            frame_count: 0,
            start_time: Utc::now(),
            session_id,
            config,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Baseline heart rate, once established from the first readings
    pub fn baseline_heart_rate(&self) -> Option<f64> {
        self.baseline_heart_rate
    }

    pub fn baseline_breathing_rate(&self) -> Option<f64> {
        self.baseline_breathing_rate
    }

    /// Score one frame's vitals and append the resulting metric
    pub fn add_metrics(
        &mut self,
        heart_rate: Option<f64>,
        breathing_rate: Option<f64>,
        gaze_direction: GazeDirection,
        blink_rate: Option<f64>,
        eye_movement_stability: f64,
        focus_duration: f64,
    ) -> Metric {
        if let Some(hr) = heart_rate {
            self.heart_rates.push(hr);
            if self.baseline_heart_rate.is_none()
                && self.heart_rates.len() >= self.config.baseline_samples
            {
                self.baseline_heart_rate = Some(mean(
                    self.heart_rates
                        .iter()
                        .take(self.config.baseline_samples)
                        .copied(),
                ));
                debug!(
                    session = %self.session_id,
                    baseline = self.baseline_heart_rate,
                    "heart-rate baseline established"
                );
            }
        }

        if let Some(br) = breathing_rate {
            self.breathing_rates.push(br);
            if self.baseline_breathing_rate.is_none()
                && self.breathing_rates.len() >= self.config.baseline_samples
            {
                self.baseline_breathing_rate = Some(mean(
                    self.breathing_rates
                        .iter()
                        .take(self.config.baseline_samples)
                        .copied(),
                ));
            }
        }

        if gaze_direction != GazeDirection::Unknown {
            self.gaze_directions.push(gaze_direction);
        }
        if let Some(rate) = blink_rate {
            self.blink_rates.push(rate);
        }
        if eye_movement_stability > 0.0 {
            self.stabilities.push(eye_movement_stability);
        }
        if focus_duration > 0.0 {
            self.focus_durations.push(focus_duration);
        }

        let focus_score = self.focus_score(
            heart_rate,
            breathing_rate,
            gaze_direction,
            eye_movement_stability,
            focus_duration,
        );
        let engagement_score =
            self.engagement_score(heart_rate, breathing_rate, gaze_direction, blink_rate);
        let thinking_intensity = self.thinking_intensity(
            heart_rate,
            breathing_rate,
            gaze_direction,
            eye_movement_stability,
        );

        let metric = Metric {
            heart_rate,
            breathing_rate,
            focus_score,
            engagement_score,
            thinking_intensity,
            gaze_direction,
            blink_rate,
            eye_movement_stability,
            focus_duration,
            timestamp: Utc::now(),
        };

        self.history.push(metric.clone());
        self.frame_count += 1;

        metric
    }

    /// Focus: vitals base peaking at the heart-rate midpoint, multiplied
    /// by gaze, eye-stability, and focus-duration factors
    fn focus_score(
        &self,
        heart_rate: Option<f64>,
        breathing_rate: Option<f64>,
        gaze_direction: GazeDirection,
        eye_movement_stability: f64,
        focus_duration: f64,
    ) -> f64 {
        let (Some(hr), Some(_br)) = (heart_rate, breathing_rate) else {
            return 0.0;
        };

        let (hr_min, hr_max) = self.config.focus_hr_range;
        let midpoint = (hr_min + hr_max) / 2.0;
        let mut base = (100.0 - 2.0 * (hr - midpoint).abs()).clamp(0.0, 100.0);

        // Stable breathing supports the base score
        let br_values: Vec<f64> = self.breathing_rates.iter().copied().collect();
        if br_values.len() >= 3 {
            let std = SignalStats::compute(&br_values).std_dev;
            let threshold = self.config.breathing_stability_threshold;
            if std >= threshold * 2.0 {
                base *= 0.8;
            } else if std >= threshold {
                base *= 0.9;
            }
        } else {
            base *= 0.95;
        }

        // Heart-rate stability bonus
        let hr_values: Vec<f64> = self.heart_rates.iter().copied().collect();
        if hr_values.len() >= 3 {
            let std = SignalStats::compute(&hr_values).std_dev;
            if std < 5.0 {
                base += 10.0;
            } else if std < 10.0 {
                base += 5.0;
            }
        }
        base = base.min(100.0);

        let gaze_factor = match gaze_direction {
            GazeDirection::Screen => 1.0,
            GazeDirection::Away => 0.5,
            GazeDirection::Unknown => 0.8,
        };

        let stability_factor = if eye_movement_stability > 80.0 {
            1.0
        } else if eye_movement_stability > 60.0 {
            0.95
        } else if eye_movement_stability > 40.0 {
            0.85
        } else if eye_movement_stability > 20.0 {
            0.7
        } else if eye_movement_stability > 0.0 {
            0.6
        } else {
            0.5
        };

        let duration_factor = if focus_duration > 5.0 {
            1.0
        } else if focus_duration > 2.0 {
            0.95
        } else if focus_duration > 0.5 {
            0.9
        } else {
            0.8
        };

        (base * gaze_factor * stability_factor * duration_factor).clamp(0.0, 100.0)
    }

    /// Engagement: heart/breathing proximity to the engaged bands,
    /// multiplied by gaze and blink-rate factors
    fn engagement_score(
        &self,
        heart_rate: Option<f64>,
        breathing_rate: Option<f64>,
        gaze_direction: GazeDirection,
        blink_rate: Option<f64>,
    ) -> f64 {
        let (Some(hr), Some(br)) = (heart_rate, breathing_rate) else {
            return 0.0;
        };

        let mut base: f64 = 50.0;

        let (hr_lo, hr_hi) = self.config.engagement_hr_range;
        if (hr_lo..=hr_hi).contains(&hr) {
            base += 30.0;
        } else if (hr_lo - 10.0..hr_lo).contains(&hr) || (hr_hi..=hr_hi + 10.0).contains(&hr) {
            base += 20.0;
        } else {
            base += 10.0;
        }

        let (br_lo, br_hi) = self.config.engagement_br_range;
        if (br_lo..=br_hi).contains(&br) {
            base += 20.0;
        } else if (br_lo - 2.0..br_lo).contains(&br) || (br_hi..=br_hi + 2.0).contains(&br) {
            base += 15.0;
        } else {
            base += 10.0;
        }
        base = base.min(100.0);

        let gaze_factor = match gaze_direction {
            GazeDirection::Screen => 1.0,
            GazeDirection::Away => 0.6,
            GazeDirection::Unknown => 0.85,
        };

        let (blink_lo, blink_hi) = self.config.normal_blink_range;
        let blink_factor = match blink_rate {
            Some(rate) if (blink_lo..=blink_hi).contains(&rate) => 1.0,
            Some(rate)
                if (blink_lo - 4.0..blink_lo).contains(&rate)
                    || (blink_hi..=blink_hi + 5.0).contains(&rate) =>
            {
                0.9
            }
            Some(rate) if rate < blink_lo - 4.0 => 0.7,
            Some(_) => 0.8,
            None => 0.9,
        };

        (base * gaze_factor * blink_factor).clamp(0.0, 100.0)
    }

    /// Thinking intensity: slow breathing and a moderate heart-rate rise
    /// over baseline, multiplied by gaze+stability factors
    fn thinking_intensity(
        &self,
        heart_rate: Option<f64>,
        breathing_rate: Option<f64>,
        gaze_direction: GazeDirection,
        eye_movement_stability: f64,
    ) -> f64 {
        let (Some(hr), Some(br)) = (heart_rate, breathing_rate) else {
            return 0.0;
        };

        let mut base: f64 = 50.0;

        let slow = self.config.thinking_breathing_slow_threshold;
        if br < slow {
            base += 30.0;
        } else if br < slow + 2.0 {
            base += 20.0;
        } else {
            base += 10.0;
        }

        let (rise_lo, rise_hi) = self.config.thinking_hr_increase;
        match self.baseline_heart_rate {
            Some(baseline) => {
                let rise = hr - baseline;
                if (rise_lo..=rise_hi).contains(&rise) {
                    base += 20.0;
                } else if rise > rise_hi {
                    base += 10.0;
                }
            }
            None => base += 10.0,
        }

        // Locked-in vitals: very low short-term variation
        let hr_values: Vec<f64> = self.heart_rates.iter().copied().collect();
        let br_values: Vec<f64> = self.breathing_rates.iter().copied().collect();
        if hr_values.len() >= 5 && br_values.len() >= 5 {
            let hr_std = SignalStats::compute(&hr_values).std_dev;
            let br_std = SignalStats::compute(&br_values).std_dev;
            if hr_std < 3.0 && br_std < 1.5 {
                base += 20.0;
            } else if hr_std < 5.0 && br_std < 2.0 {
                base += 10.0;
            }
        }
        base = base.min(100.0);

        let gaze_stability_factor = match gaze_direction {
            GazeDirection::Screen if eye_movement_stability > 70.0 => 1.0,
            GazeDirection::Screen if eye_movement_stability > 50.0 => 0.9,
            GazeDirection::Screen => 0.75,
            GazeDirection::Away => 0.5,
            GazeDirection::Unknown => 0.7,
        };

        let stability_factor = if eye_movement_stability > 80.0 {
            1.0
        } else if eye_movement_stability > 60.0 {
            0.9
        } else if eye_movement_stability > 40.0 {
            0.75
        } else if eye_movement_stability > 20.0 {
            0.6
        } else if eye_movement_stability > 0.0 {
            0.5
        } else {
            0.4
        };

        (base * gaze_stability_factor * stability_factor).clamp(0.0, 100.0)
    }

    /// Aggregate snapshot; `None` until a metric has been recorded
    pub fn aggregate(&self) -> Option<AggregatedMetrics> {
        if self.history.is_empty() {
            return None;
        }

        let heart_rates: Vec<f64> = self.history.iter().filter_map(|m| m.heart_rate).collect();
        let breathing_rates: Vec<f64> = self
            .history
            .iter()
            .filter_map(|m| m.breathing_rate)
            .collect();

        let std_of = |values: &[f64]| {
            (values.len() > 1).then(|| SignalStats::compute(values).std_dev)
        };

        Some(AggregatedMetrics {
            average_heart_rate: (!heart_rates.is_empty())
                .then(|| mean(heart_rates.iter().copied())),
            average_breathing_rate: (!breathing_rates.is_empty())
                .then(|| mean(breathing_rates.iter().copied())),
            average_focus_score: mean(self.history.iter().map(|m| m.focus_score)),
            average_engagement_score: mean(self.history.iter().map(|m| m.engagement_score)),
            average_thinking_intensity: mean(self.history.iter().map(|m| m.thinking_intensity)),
            heart_rate_std_dev: std_of(&heart_rates),
            breathing_rate_std_dev: std_of(&breathing_rates),
            total_frames: self.frame_count,
        })
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0u64), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scorer() -> SessionScorer {
        SessionScorer::new("test-session".into(), ScoringConfig::default())
    }

    fn add(scorer: &mut SessionScorer, hr: f64, br: f64) -> Metric {
        scorer.add_metrics(Some(hr), Some(br), GazeDirection::Screen, None, 90.0, 6.0)
    }

    #[test]
    fn test_baseline_set_exactly_once_from_first_five() {
        let mut scorer = scorer();

        for hr in [70.0, 72.0, 71.0, 73.0] {
            add(&mut scorer, hr, 15.0);
            assert!(scorer.baseline_heart_rate().is_none());
        }

        add(&mut scorer, 74.0, 15.0);
        let baseline = scorer.baseline_heart_rate().unwrap();
        assert!((baseline - 72.0).abs() < 1e-9);

        // Later readings never move the baseline
        for _ in 0..20 {
            add(&mut scorer, 120.0, 15.0);
        }
        assert!((scorer.baseline_heart_rate().unwrap() - 72.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_vitals_score_zero() {
        let mut scorer = scorer();
        let metric =
            scorer.add_metrics(None, Some(15.0), GazeDirection::Screen, None, 90.0, 6.0);
        assert_eq!(metric.focus_score, 0.0);
        assert_eq!(metric.engagement_score, 0.0);
        assert_eq!(metric.thinking_intensity, 0.0);
    }

    #[test]
    fn test_engagement_known_value() {
        let scorer = scorer();
        // hr 80 (+30), br 15 (+20), screen gaze, unmeasured blinks (x0.9)
        let score =
            scorer.engagement_score(Some(80.0), Some(15.0), GazeDirection::Screen, None);
        assert!((score - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_focus_midpoint_peak() {
        let scorer = scorer();
        let at_peak = scorer.focus_score(Some(80.0), Some(15.0), GazeDirection::Screen, 90.0, 6.0);
        let off_peak =
            scorer.focus_score(Some(95.0), Some(15.0), GazeDirection::Screen, 90.0, 6.0);
        assert!(at_peak > off_peak);
        // First-frame breathing history applies the insufficient-data factor
        assert!((at_peak - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_away_gaze_halves_focus() {
        let scorer = scorer();
        let on = scorer.focus_score(Some(80.0), Some(15.0), GazeDirection::Screen, 90.0, 6.0);
        let away = scorer.focus_score(Some(80.0), Some(15.0), GazeDirection::Away, 90.0, 6.0);
        assert!((away - on * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_thinking_rewards_baseline_rise() {
        let mut scorer = scorer();
        // Establish a 70 BPM baseline; varied breathing keeps the
        // locked-in-vitals bonus out of the way
        for br in [12.0, 18.0, 13.0, 17.0, 15.0] {
            add(&mut scorer, 70.0, br);
        }
        let baseline = scorer.baseline_heart_rate().unwrap();
        assert!((baseline - 70.0).abs() < 1e-9);

        // A 7 BPM rise lands in the most-rewarded band
        let rise = scorer.thinking_intensity(Some(77.0), Some(13.0), GazeDirection::Screen, 90.0);
        let no_rise =
            scorer.thinking_intensity(Some(70.0), Some(13.0), GazeDirection::Screen, 90.0);
        assert!((rise - 90.0).abs() < 1e-9);
        assert!((no_rise - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_determinism() {
        let mut a = scorer();
        let mut b = scorer();
        let inputs = [
            (72.0, 14.0, GazeDirection::Screen, Some(15.0), 85.0, 3.0),
            (75.0, 13.0, GazeDirection::Away, None, 40.0, 0.0),
            (71.0, 16.0, GazeDirection::Unknown, Some(9.0), 65.0, 1.0),
        ];

        for (hr, br, gaze, blink, stab, dur) in inputs {
            let ma = a.add_metrics(Some(hr), Some(br), gaze, blink, stab, dur);
            let mb = b.add_metrics(Some(hr), Some(br), gaze, blink, stab, dur);
            assert_eq!(ma.focus_score, mb.focus_score);
            assert_eq!(ma.engagement_score, mb.engagement_score);
            assert_eq!(ma.thinking_intensity, mb.thinking_intensity);
        }
    }

    #[test]
    fn test_aggregate_none_iff_no_metrics() {
        let mut scorer = scorer();
        assert!(scorer.aggregate().is_none());

        for i in 0..7 {
            add(&mut scorer, 70.0 + i as f64, 15.0);
        }

        let aggregate = scorer.aggregate().unwrap();
        assert_eq!(aggregate.total_frames, 7);
        assert!((aggregate.average_heart_rate.unwrap() - 73.0).abs() < 1e-9);
        assert!(aggregate.heart_rate_std_dev.unwrap() > 0.0);
        assert!(aggregate.average_focus_score > 0.0);
    }

    #[test]
    fn test_aggregate_without_measured_vitals() {
        let mut scorer = scorer();
        scorer.add_metrics(None, None, GazeDirection::Screen, None, 80.0, 2.0);

        let aggregate = scorer.aggregate().unwrap();
        assert!(aggregate.average_heart_rate.is_none());
        assert!(aggregate.heart_rate_std_dev.is_none());
        assert_eq!(aggregate.total_frames, 1);
    }

    proptest! {
        #[test]
        fn scores_always_clamped(
            hr in -500.0f64..500.0,
            br in -100.0f64..100.0,
            blink in proptest::option::of(-50.0f64..200.0),
            stability in -10.0f64..150.0,
            duration in -5.0f64..600.0,
            gaze_idx in 0usize..3,
        ) {
            let gaze = [GazeDirection::Screen, GazeDirection::Away, GazeDirection::Unknown][gaze_idx];
            let mut scorer = SessionScorer::new("prop".into(), ScoringConfig::default());

            for _ in 0..3 {
                let metric = scorer.add_metrics(Some(hr), Some(br), gaze, blink, stability, duration);
                prop_assert!((0.0..=100.0).contains(&metric.focus_score));
                prop_assert!((0.0..=100.0).contains(&metric.engagement_score));
                prop_assert!((0.0..=100.0).contains(&metric.thinking_intensity));
            }
        }
    }
}
