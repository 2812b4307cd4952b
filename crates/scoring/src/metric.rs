//! Metric and aggregate types

use chrono::{DateTime, Utc};
use gaze::GazeDirection;
use serde::{Deserialize, Serialize};

/// One scored frame. Appended to session history, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breathing_rate: Option<f64>,
    /// Focus index 0-100
    pub focus_score: f64,
    /// Engagement index 0-100
    pub engagement_score: f64,
    /// Thinking-intensity index 0-100
    pub thinking_intensity: f64,
    pub gaze_direction: GazeDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blink_rate: Option<f64>,
    pub eye_movement_stability: f64,
    pub focus_duration: f64,
    pub timestamp: DateTime<Utc>,
}

/// End-of-session aggregate snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_breathing_rate: Option<f64>,
    pub average_focus_score: f64,
    pub average_engagement_score: f64,
    pub average_thinking_intensity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate_std_dev: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breathing_rate_std_dev: Option<f64>,
    pub total_frames: u64,
}
