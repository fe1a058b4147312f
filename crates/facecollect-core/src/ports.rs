//! Boundaries between the orchestrator and the outside world.
//!
//! Camera, backend endpoints, pacing clock and UI are all traits here so the
//! capture loop can run against fakes.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::overlay::Overlay;
use crate::registry::RegisteredFaceSet;
use crate::types::{CaptureResult, EncodedImage, FaceRegion, Stored, TrainedModel, TransportError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("camera not available: {0}")]
    DeviceUnavailable(String),
    #[error("Please start the camera first.")]
    CameraNotStarted,
    #[error("frame capture failed: {0}")]
    CaptureFailed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    #[error("No faces (persons) detected in the frame. Please ensure your face is visible.")]
    NoFaceDetected,
    /// The service answered with `success: false`.
    #[error("{0}")]
    Rejected(String),
    #[error("Error during capture: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    /// Server-supplied error message, verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("Error during capture: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrainError {
    #[error("Training failed: {0}")]
    Failed(String),
    #[error("Error during training request: {0}")]
    Transport(#[from] TransportError),
    #[error("a capture run or training is already in progress")]
    Busy,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{0}")]
    Failed(String),
    #[error("{0}")]
    Transport(#[from] TransportError),
}

/// Camera stream that yields encoded still frames.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Open the camera. Calling it while the camera is already open is a no-op.
    async fn acquire(&self) -> Result<(), MediaError>;

    /// Grab the current frame as a base64 JPEG.
    async fn extract_frame(&self) -> Result<EncodedImage, MediaError>;
}

/// Face detection endpoint.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Returns at least one region on success; an empty result is `NoFaceDetected`.
    async fn detect(&self, frame: &EncodedImage) -> Result<Vec<FaceRegion>, DetectError>;
}

/// Labeled sample storage endpoint.
#[async_trait]
pub trait Persister: Send + Sync {
    async fn persist(
        &self,
        frame: &EncodedImage,
        detections: &[FaceRegion],
        label: &str,
    ) -> Result<Stored, PersistError>;
}

/// Model training endpoint.
#[async_trait]
pub trait Trainer: Send + Sync {
    async fn train(&self) -> Result<TrainedModel, TrainError>;
}

/// Registered faces endpoint.
#[async_trait]
pub trait FaceRegistry: Send + Sync {
    async fn fetch(&self) -> Result<RegisteredFaceSet, FetchError>;
}

/// Suspends the capture loop between iterations.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, interval: Duration);
}

/// Wall-clock pacing on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, interval: Duration) {
        tokio::time::sleep(interval).await;
    }
}

/// Everything the orchestrator shows to the user.
pub trait Ui: Send + Sync {
    /// Replace the status line.
    fn set_message(&self, text: &str);

    fn set_progress(&self, captured: u32, target: u32);

    /// Boxes and captions for the faces of the last stored frame.
    fn draw_overlay(&self, overlay: &Overlay);

    /// Rendered registered-face list, or the fetch-failure placeholder.
    fn set_registered_faces(&self, text: &str);

    /// Enable or disable the capture and train controls together.
    fn set_controls_enabled(&self, enabled: bool);

    /// Outcome of a single step, before the loop reacts to it.
    fn capture_result(&self, _index: u32, _result: &CaptureResult) {}
}
