//! Vitals Pipeline API Server
//!
//! HTTP boundary exposing the session lifecycle: start, per-frame
//! metrics, stop-with-aggregate, and a health probe.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use session_registry::{RegistryError, SessionRegistry};
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod rate_limit;
mod routes;
mod settings;

pub use rate_limit::RateLimitConfig;
pub use settings::Settings;

/// Application state shared across handlers
pub struct AppState {
    /// Session registry
    pub registry: SessionRegistry,
    /// Loaded settings
    pub settings: Settings,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create application state from settings
    pub fn new(settings: Settings) -> Self {
        Self {
            registry: SessionRegistry::new(settings.pipeline.clone()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            settings,
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
    pub vendor_configured: bool,
    pub landmark_model_configured: bool,
}

/// Error payload returned to callers
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Caller-visible error with its HTTP status
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        let status = match err {
            RegistryError::UnknownSession(_) => StatusCode::NOT_FOUND,
            RegistryError::MissingSessionId
            | RegistryError::MissingApiKey
            | RegistryError::InvalidImage(_) => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Create the application router.
///
/// Session lifecycle routes carry GCRA rate limiting; the frame route
/// does not (it receives a steady per-session stream).
pub fn create_router(state: Arc<AppState>) -> Router {
    let governor = rate_limit::create_governor_config(&RateLimitConfig::lenient());

    let lifecycle = Router::new()
        .route("/api/vitals/session/start", post(routes::vitals::start_session))
        .route("/api/vitals/session/stop", post(routes::vitals::stop_session))
        .layer(GovernorLayer { config: governor });

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/vitals/frame", post(routes::vitals::process_frame))
        .merge(lifecycle)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: "vitals-pipeline".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        active_sessions: state.registry.active_sessions().await,
        vendor_configured: state.settings.pipeline.vendor.wrapper_path.is_some(),
        landmark_model_configured: state
            .settings
            .pipeline
            .vision
            .landmark_model_path
            .is_some(),
    };

    Json(response)
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let addr = format!("{}:{}", settings.host, settings.port);
    let state = Arc::new(AppState::new(settings));
    let app = create_router(state);

    info!("Starting vitals pipeline API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
