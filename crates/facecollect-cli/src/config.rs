use std::time::Duration;

use facecollect_client::BackendConfig;
use facecollect_core::DEFAULT_TARGET;
use facecollect_hw::MediaConfig;

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Client configuration, loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the detection/training API.
    pub api_url: String,
    /// Origin serving `/capture_data` (default: the API URL).
    pub capture_url: String,
    /// V4L2 device path (default: /dev/video0).
    pub camera_device: String,
    /// Number of warmup frames to discard after opening the camera.
    pub warmup_frames: usize,
    /// Frames collected per capture run.
    pub images_per_run: u32,
    /// Pause between two capture steps.
    pub capture_interval: Duration,
    /// JPEG quality (1–100) of frames sent to the backend.
    pub jpeg_quality: u8,
    /// Per-request timeout; unset means requests may wait indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from `FACECOLLECT_*` environment variables with defaults.
    ///
    /// `API_URL` is honoured as a fallback for the API base URL.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = var("FACECOLLECT_API_URL")
            .or_else(|| var("API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let capture_url = var("FACECOLLECT_CAPTURE_URL").unwrap_or_else(|| api_url.clone());

        Self {
            capture_url,
            api_url,
            camera_device: var("FACECOLLECT_CAMERA_DEVICE")
                .unwrap_or_else(|| "/dev/video0".to_string()),
            warmup_frames: parsed(&var, "FACECOLLECT_WARMUP_FRAMES").unwrap_or(4),
            images_per_run: parsed(&var, "FACECOLLECT_IMAGES_PER_RUN").unwrap_or(DEFAULT_TARGET),
            capture_interval: Duration::from_millis(
                parsed(&var, "FACECOLLECT_CAPTURE_INTERVAL_MS").unwrap_or(500),
            ),
            jpeg_quality: parsed::<u8>(&var, "FACECOLLECT_JPEG_QUALITY")
                .unwrap_or(70)
                .clamp(1, 100),
            request_timeout: parsed(&var, "FACECOLLECT_REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs),
        }
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            api_url: self.api_url.clone(),
            capture_url: self.capture_url.clone(),
            timeout: self.request_timeout,
        }
    }

    pub fn media_config(&self) -> MediaConfig {
        MediaConfig {
            device: self.camera_device.clone(),
            warmup_frames: self.warmup_frames,
            jpeg_quality: self.jpeg_quality,
        }
    }
}

fn parsed<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    var(key).and_then(|v| v.trim().parse().ok())
}
