//! Session Scoring
//!
//! Turns per-frame vitals into three derived 0-100 indices (focus,
//! engagement, thinking intensity) against per-session rolling baselines,
//! and aggregates a session summary at teardown.

mod config;
mod metric;
mod scorer;

pub use config::ScoringConfig;
pub use metric::{AggregatedMetrics, Metric};
pub use scorer::SessionScorer;
