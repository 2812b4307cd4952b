//! Registry implementation

use crate::RegistryError;
use gaze::{select_tracker, GazeConfig};
use rppg::{HeartRateMonitor, RppgConfig};
use scoring::{AggregatedMetrics, Metric, ScoringConfig, SessionScorer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use video_frame::decode_frame;
use vision::{FaceDetector, VisionConfig};
use vitals::{FallbackChain, MetricsCombiner, MetricsSource, VendorBridge, VendorConfig};

/// Aggregate configuration for everything a session embeds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub vision: VisionConfig,
    pub rppg: RppgConfig,
    pub gaze: GazeConfig,
    pub scoring: ScoringConfig,
    pub vendor: VendorConfig,
}

/// Outcome of a `start` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Created,
    /// The id was already active; existing state is untouched
    AlreadyActive,
}

/// One scored frame plus the provenance consumers must inspect
#[derive(Debug, Clone, Serialize)]
pub struct ScoredFrame {
    pub metric: Metric,
    /// Source tier that produced the vitals; `simulated` is a placeholder
    pub source: MetricsSource,
    /// Composite signal quality 0-100
    pub overall_quality: f64,
}

/// Live state for one session
struct SessionState {
    chain: FallbackChain,
    scorer: SessionScorer,
}

impl SessionState {
    fn new(session_id: &str, api_key: &str, config: &PipelineConfig) -> Self {
        let monitor = HeartRateMonitor::new(
            config.rppg.clone(),
            FaceDetector::new(&config.vision),
        );
        let tracker = select_tracker(&config.vision, config.gaze.clone());
        let combiner = MetricsCombiner::new(monitor, tracker);
        let vendor = VendorBridge::from_config(&config.vendor);

        Self {
            chain: FallbackChain::new(combiner, vendor, api_key.to_string()),
            scorer: SessionScorer::new(session_id.to_string(), config.scoring.clone()),
        }
    }
}

/// Concurrency-safe map from session id to live session state
pub struct SessionRegistry {
    config: PipelineConfig,
    sessions: Mutex<HashMap<String, Arc<Mutex<SessionState>>>>,
}

impl SessionRegistry {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start a session. Idempotent: an already-active id succeeds without
    /// discarding anything it has accumulated.
    pub async fn start(&self, session_id: &str, api_key: &str) -> Result<StartOutcome, RegistryError> {
        if session_id.is_empty() {
            return Err(RegistryError::MissingSessionId);
        }
        if api_key.is_empty() {
            return Err(RegistryError::MissingApiKey);
        }

        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(session_id) {
            debug!(session = session_id, "start on active session (idempotent)");
            return Ok(StartOutcome::AlreadyActive);
        }

        let state = SessionState::new(session_id, api_key, &self.config);
        sessions.insert(session_id.to_string(), Arc::new(Mutex::new(state)));
        info!(session = session_id, "session started");
        Ok(StartOutcome::Created)
    }

    /// Process one frame for a session.
    ///
    /// The per-session lock serializes frames of the same session; the
    /// registry lock is released before any processing starts.
    pub async fn frame(
        &self,
        session_id: &str,
        image: &[u8],
        timestamp: Option<f64>,
    ) -> Result<ScoredFrame, RegistryError> {
        let session = {
            let sessions = self.sessions.lock().await;
            sessions
                .get(session_id)
                .cloned()
                .ok_or_else(|| RegistryError::UnknownSession(session_id.to_string()))?
        };

        let timestamp = timestamp.unwrap_or_else(now_secs);
        let frame = decode_frame(image, timestamp)?;

        let mut state = session.lock().await;
        let record = state.chain.next_record(&frame, timestamp).await;

        let metric = state.scorer.add_metrics(
            record.heart_rate,
            record.breathing_rate,
            record.gaze_direction,
            record.blink_rate,
            record.eye_movement_stability,
            record.focus_duration,
        );

        Ok(ScoredFrame {
            metric,
            source: record.source,
            overall_quality: record.overall_quality,
        })
    }

    /// Stop a session: remove it, reset its extractors, and return the
    /// aggregate (`None` when no metrics were collected). A stopped id
    /// is unreachable afterwards.
    pub async fn stop(
        &self,
        session_id: &str,
    ) -> Result<Option<AggregatedMetrics>, RegistryError> {
        let session = {
            let mut sessions = self.sessions.lock().await;
            sessions
                .remove(session_id)
                .ok_or_else(|| RegistryError::UnknownSession(session_id.to_string()))?
        };

        let mut state = session.lock().await;
        state.chain.reset();
        let aggregate = state.scorer.aggregate();
        info!(
            session = session_id,
            frames = state.scorer.frame_count(),
            "session stopped"
        );
        Ok(aggregate)
    }

    /// Number of active sessions
    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

fn now_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(PipelineConfig::default())
    }

    fn png_frame() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(16, 16, image::Rgb([0, 0, 0]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_start_validates_inputs() {
        let registry = registry();
        assert!(matches!(
            registry.start("", "key").await,
            Err(RegistryError::MissingSessionId)
        ));
        assert!(matches!(
            registry.start("s1", "").await,
            Err(RegistryError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_start_is_idempotent_and_preserves_metrics() {
        let registry = registry();
        assert_eq!(
            registry.start("s1", "key").await.unwrap(),
            StartOutcome::Created
        );

        let frame = png_frame();
        registry.frame("s1", &frame, Some(0.0)).await.unwrap();
        registry.frame("s1", &frame, Some(0.033)).await.unwrap();

        // Second start must not discard the two recorded frames
        assert_eq!(
            registry.start("s1", "key").await.unwrap(),
            StartOutcome::AlreadyActive
        );
        registry.frame("s1", &frame, Some(0.066)).await.unwrap();

        let aggregate = registry.stop("s1").await.unwrap().unwrap();
        assert_eq!(aggregate.total_frames, 3);
    }

    #[tokio::test]
    async fn test_frame_unknown_session() {
        let registry = registry();
        let err = registry.frame("nope", &png_frame(), None).await.unwrap_err();
        assert!(matches!(err, RegistryError::UnknownSession(_)));
    }

    #[tokio::test]
    async fn test_frame_rejects_bad_image() {
        let registry = registry();
        registry.start("s1", "key").await.unwrap();

        let err = registry
            .frame("s1", &[0xde, 0xad, 0xbe, 0xef], None)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidImage(_)));

        // The bad frame never reached the scorer
        let aggregate = registry.stop("s1").await.unwrap();
        assert!(aggregate.is_none());
    }

    #[tokio::test]
    async fn test_frame_reports_source_tag() {
        let registry = registry();
        registry.start("s1", "key").await.unwrap();

        // A dark 16x16 frame has no face and no vendor is configured:
        // the chain must fall through to the tagged placeholder
        let scored = registry.frame("s1", &png_frame(), Some(0.0)).await.unwrap();
        assert_eq!(scored.source, MetricsSource::Simulated);
        assert!(scored.metric.heart_rate.is_some());
    }

    #[tokio::test]
    async fn test_stop_unknown_and_terminal() {
        let registry = registry();
        assert!(matches!(
            registry.stop("ghost").await,
            Err(RegistryError::UnknownSession(_))
        ));

        registry.start("s1", "key").await.unwrap();
        registry.stop("s1").await.unwrap();
        // Closed is terminal: the id is unreachable afterwards
        assert!(matches!(
            registry.stop("s1").await,
            Err(RegistryError::UnknownSession(_))
        ));
        assert!(matches!(
            registry.frame("s1", &png_frame(), None).await,
            Err(RegistryError::UnknownSession(_))
        ));
        assert_eq!(registry.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let registry = registry();
        registry.start("a", "key").await.unwrap();
        registry.start("b", "key").await.unwrap();

        let frame = png_frame();
        registry.frame("a", &frame, Some(0.0)).await.unwrap();
        registry.frame("a", &frame, Some(0.033)).await.unwrap();
        registry.frame("b", &frame, Some(0.0)).await.unwrap();

        assert_eq!(
            registry.stop("a").await.unwrap().unwrap().total_frames,
            2
        );
        assert_eq!(
            registry.stop("b").await.unwrap().unwrap().total_frames,
            1
        );
    }
}
