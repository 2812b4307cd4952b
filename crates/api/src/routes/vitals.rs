//! Session lifecycle and frame routes

use crate::{ApiError, AppState};
use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use scoring::{AggregatedMetrics, Metric};
use serde::{Deserialize, Serialize};
use session_registry::StartOutcome;
use std::sync::Arc;
use tracing::debug;
use vitals::MetricsSource;

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub success: bool,
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct FrameRequest {
    #[serde(default)]
    pub session_id: String,
    /// Base64-encoded compressed image
    #[serde(default)]
    pub frame: String,
    pub timestamp: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct FrameResponse {
    pub success: bool,
    pub metrics: Metric,
    /// Vitals provenance; `simulated` marks placeholder data
    pub source: MetricsSource,
    pub overall_quality: f64,
}

#[derive(Debug, Deserialize)]
pub struct StopRequest {
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregated_metrics: Option<AggregatedMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Start a vitals collection session (idempotent)
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> Result<Json<StartResponse>, ApiError> {
    let api_key = request
        .api_key
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| state.settings.default_api_key.clone());

    let outcome = state.registry.start(&request.session_id, &api_key).await?;

    let message = match outcome {
        StartOutcome::Created => "Session started",
        StartOutcome::AlreadyActive => "Session already exists",
    };

    Ok(Json(StartResponse {
        success: true,
        session_id: request.session_id,
        message: message.to_string(),
    }))
}

/// Process one video frame and return the scored metric
pub async fn process_frame(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FrameRequest>,
) -> Result<Json<FrameResponse>, ApiError> {
    if request.session_id.is_empty() || request.frame.is_empty() {
        return Err(ApiError::bad_request("session_id and frame are required"));
    }

    let image = BASE64
        .decode(request.frame.as_bytes())
        .map_err(|e| ApiError::bad_request(format!("Invalid frame encoding: {e}")))?;

    let scored = state
        .registry
        .frame(&request.session_id, &image, request.timestamp)
        .await?;

    debug!(
        session = %request.session_id,
        source = ?scored.source,
        "frame scored"
    );

    Ok(Json(FrameResponse {
        success: true,
        metrics: scored.metric,
        source: scored.source,
        overall_quality: scored.overall_quality,
    }))
}

/// Stop a session and return its aggregate
pub async fn stop_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StopRequest>,
) -> Result<Json<StopResponse>, ApiError> {
    if request.session_id.is_empty() {
        return Err(ApiError::bad_request("session_id is required"));
    }

    let aggregated = state.registry.stop(&request.session_id).await?;

    let message = aggregated
        .is_none()
        .then(|| "Session stopped but no metrics collected".to_string());

    Ok(Json(StopResponse {
        success: true,
        aggregated_metrics: aggregated,
        message,
    }))
}
