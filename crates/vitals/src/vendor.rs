//! Vendor biometrics subprocess bridge

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;
use video_frame::VideoFrame;

/// Vendor subprocess configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    /// Wrapper binary path (absent = vendor tier disabled)
    pub wrapper_path: Option<String>,

    /// Subprocess deadline (seconds)
    pub timeout_secs: u64,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            wrapper_path: None,
            timeout_secs: 5,
        }
    }
}

/// Vendor bridge error types; all recoverable by the fallback chain
#[derive(Error, Debug)]
pub enum VendorError {
    #[error("Failed to encode frame: {0}")]
    Encode(String),

    #[error("Failed to run wrapper: {0}")]
    Io(#[from] std::io::Error),

    #[error("Wrapper exceeded {0}s deadline")]
    Timeout(u64),

    #[error("Wrapper exited with {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },

    #[error("Wrapper output is not valid JSON: {0}")]
    Malformed(String),

    #[error("Wrapper output missing {0}")]
    MissingField(&'static str),
}

/// Parsed wrapper stdout; both rates are required for acceptance
#[derive(Debug, Deserialize)]
struct VendorPayload {
    heart_rate: Option<f64>,
    breathing_rate: Option<f64>,
}

/// Accepted vendor reading
#[derive(Debug, Clone, Copy)]
pub struct VendorVitals {
    pub heart_rate: f64,
    pub breathing_rate: f64,
}

/// Invokes the vendor wrapper binary with `(temp_image_path, api_key)`.
///
/// Contract: the wrapper prints one JSON object
/// `{"heart_rate": n, "breathing_rate": n}` to stdout and exits 0 within
/// the deadline. Anything else is a recoverable [`VendorError`].
pub struct VendorBridge {
    wrapper_path: PathBuf,
    timeout: Duration,
    timeout_secs: u64,
}

impl VendorBridge {
    /// Build the bridge when a wrapper is configured
    pub fn from_config(config: &VendorConfig) -> Option<Self> {
        config.wrapper_path.as_ref().map(|path| Self {
            wrapper_path: PathBuf::from(path),
            timeout: Duration::from_secs(config.timeout_secs),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Read vitals for one frame through the wrapper
    pub async fn read_vitals(
        &self,
        frame: &VideoFrame,
        api_key: &str,
    ) -> Result<VendorVitals, VendorError> {
        let temp = tempfile::Builder::new()
            .prefix("vitals-frame-")
            .suffix(".jpg")
            .tempfile()?;

        let img = image::RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
            .ok_or_else(|| VendorError::Encode("frame buffer size mismatch".into()))?;
        img.save_with_format(temp.path(), image::ImageFormat::Jpeg)
            .map_err(|e| VendorError::Encode(e.to_string()))?;

        debug!(path = %temp.path().display(), "invoking vendor wrapper");

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.wrapper_path)
                .arg(temp.path())
                .arg(api_key)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| VendorError::Timeout(self.timeout_secs))??;

        if !output.status.success() {
            return Err(VendorError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let payload: VendorPayload = serde_json::from_str(stdout.trim())
            .map_err(|e| VendorError::Malformed(e.to_string()))?;

        let heart_rate = payload
            .heart_rate
            .ok_or(VendorError::MissingField("heart_rate"))?;
        let breathing_rate = payload
            .breathing_rate
            .ok_or(VendorError::MissingField("breathing_rate"))?;

        Ok(VendorVitals {
            heart_rate,
            breathing_rate,
        })
    }
}
