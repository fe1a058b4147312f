//! Camera stream exposed to the orchestrator as a [`FrameSource`].
//!
//! V4L2 I/O is blocking, so the camera lives on a dedicated OS thread and
//! async callers reach it through a request channel. Frames are encoded to
//! base64 JPEG on that thread too.

use async_trait::async_trait;
use facecollect_core::{EncodedImage, FrameSource, MediaError};
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::camera::{Camera, CameraError};
use crate::frame::DEFAULT_JPEG_QUALITY;

/// Camera settings for a [`MediaCapture`].
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// V4L2 device path.
    pub device: String,
    /// Frames discarded right after opening.
    pub warmup_frames: usize,
    /// JPEG quality, 1–100.
    pub jpeg_quality: u8,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            warmup_frames: 4,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Messages sent from async callers to the camera thread.
enum CameraRequest {
    Frame {
        quality: u8,
        reply: oneshot::Sender<Result<String, CameraError>>,
    },
}

/// Clone-safe handle to the camera thread.
#[derive(Clone)]
struct CameraHandle {
    tx: mpsc::Sender<CameraRequest>,
}

impl CameraHandle {
    async fn capture_encoded(&self, quality: u8) -> Result<String, CameraError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(CameraRequest::Frame {
                quality,
                reply: reply_tx,
            })
            .await
            .map_err(|_| CameraError::WorkerExited)?;
        reply_rx.await.map_err(|_| CameraError::WorkerExited)?
    }
}

/// Open the camera, discard warmup frames, then serve frame requests on a
/// dedicated thread. Fails fast if the device cannot be opened.
fn spawn_camera(device: &str, warmup_frames: usize) -> Result<CameraHandle, CameraError> {
    let camera = Camera::open(device)?;
    tracing::info!(
        device,
        width = camera.width,
        height = camera.height,
        fourcc = ?camera.fourcc,
        "camera opened"
    );

    if warmup_frames > 0 {
        tracing::info!(count = warmup_frames, "discarding warmup frames");
        camera.discard_frames(warmup_frames);
    }

    let (tx, mut rx) = mpsc::channel::<CameraRequest>(4);

    std::thread::Builder::new()
        .name("facecollect-camera".into())
        .spawn(move || {
            tracing::info!("camera thread started");
            while let Some(req) = rx.blocking_recv() {
                match req {
                    CameraRequest::Frame { quality, reply } => {
                        let result = camera
                            .capture_frame()
                            .and_then(|frame| Ok(frame.to_base64_jpeg(quality)?));
                        if let Err(e) = &result {
                            tracing::warn!(error = %e, "frame capture failed");
                        }
                        let _ = reply.send(result);
                    }
                }
            }
            tracing::info!("camera thread exiting");
        })
        .map_err(|e| CameraError::CaptureFailed(format!("failed to spawn camera thread: {e}")))?;

    Ok(CameraHandle { tx })
}

/// Lazily opened camera. The first [`acquire`](FrameSource::acquire) opens
/// the device; later calls are no-ops.
pub struct MediaCapture {
    config: MediaConfig,
    handle: Mutex<Option<CameraHandle>>,
}

impl MediaCapture {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            config,
            handle: Mutex::new(None),
        }
    }
}

#[async_trait]
impl FrameSource for MediaCapture {
    async fn acquire(&self) -> Result<(), MediaError> {
        let mut handle = self.handle.lock().await;
        if handle.is_some() {
            return Ok(());
        }

        let device = self.config.device.clone();
        let warmup = self.config.warmup_frames;
        let spawned = tokio::task::spawn_blocking(move || spawn_camera(&device, warmup))
            .await
            .map_err(|e| MediaError::DeviceUnavailable(format!("camera open task failed: {e}")))?;

        *handle = Some(spawned.map_err(into_media_error)?);
        Ok(())
    }

    async fn extract_frame(&self) -> Result<EncodedImage, MediaError> {
        let handle = self
            .handle
            .lock()
            .await
            .clone()
            .ok_or(MediaError::CameraNotStarted)?;
        let encoded = handle
            .capture_encoded(self.config.jpeg_quality)
            .await
            .map_err(into_media_error)?;
        tracing::trace!(bytes = encoded.len(), "frame encoded");
        Ok(EncodedImage::from_base64(encoded))
    }
}

fn into_media_error(e: CameraError) -> MediaError {
    match e {
        CameraError::PermissionDenied(path) => MediaError::PermissionDenied(path),
        CameraError::DeviceNotFound(detail) => MediaError::DeviceUnavailable(detail),
        e @ (CameraError::DeviceBusy
        | CameraError::StreamingNotSupported
        | CameraError::FormatNegotiationFailed(_)) => MediaError::DeviceUnavailable(e.to_string()),
        e @ (CameraError::CaptureFailed(_) | CameraError::Frame(_) | CameraError::WorkerExited) => {
            MediaError::CaptureFailed(e.to_string())
        }
    }
}
