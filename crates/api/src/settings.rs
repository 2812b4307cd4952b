//! Service settings

use serde::Deserialize;
use session_registry::PipelineConfig;

/// Service settings loaded from an optional config file plus environment
/// overrides (`PIPELINE__*`, e.g. `PIPELINE__PORT=5002`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// API key used when a start request carries none
    pub default_api_key: String,
    /// Everything the per-session pipeline embeds
    pub pipeline: PipelineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5002,
            default_api_key: String::new(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from `pipeline.toml` (optional) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("pipeline").required(false))
            .add_source(config::Environment::with_prefix("PIPELINE").separator("__"))
            .build()?
            .try_deserialize()
    }
}
