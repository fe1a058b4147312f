//! Capture orchestration: N sequential detect → persist steps for one label.
//!
//! A run stops on the first failing step. Between steps the loop pauses for a
//! fixed interval through the injected [`Pacer`], which both throttles the
//! backend and gives the camera time to produce a fresh frame.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;

use crate::gate::ControlGate;
use crate::overlay::Overlay;
use crate::ports::{
    DetectError, Detector, FaceRegistry, FrameSource, MediaError, Pacer, PersistError, Persister,
    TokioPacer, TrainError, Trainer, Ui,
};
use crate::registry::{self, RegisteredFaceSet};
use crate::session::{RunState, Session};
use crate::training;
use crate::types::{CaptureResult, FaceRegion, Stored, TrainedModel};

/// Pause between two capture steps.
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("Please start the camera first.")]
    CameraNotStarted,
    #[error("Please enter a name for the face.")]
    InvalidLabel,
    #[error("number of images to capture must be at least 1")]
    InvalidTarget,
    #[error("a capture run or training is already in progress")]
    Busy,
}

/// Why a single step failed.
#[derive(Error, Debug)]
enum StepError {
    #[error(transparent)]
    Frame(#[from] MediaError),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

struct StepOutput {
    stored: Stored,
    regions: Vec<FaceRegion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Stopped,
}

/// Final report of a capture run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub label: String,
    pub captured: u32,
    pub target: u32,
    /// Error of the step that stopped the run.
    pub error: Option<String>,
    /// Closing status line shown to the user.
    pub message: String,
}

/// Backend endpoints used by the orchestrator.
#[derive(Clone)]
pub struct Clients {
    pub detector: Arc<dyn Detector>,
    pub persister: Arc<dyn Persister>,
    pub trainer: Arc<dyn Trainer>,
    pub registry: Arc<dyn FaceRegistry>,
}

/// Owns the session and drives every user command against the backend.
pub struct CaptureOrchestrator {
    media: Arc<dyn FrameSource>,
    clients: Clients,
    ui: Arc<dyn Ui>,
    pacer: Arc<dyn Pacer>,
    pacing: Duration,
    gate: ControlGate,
    session: Mutex<Session>,
}

impl CaptureOrchestrator {
    pub fn new(media: Arc<dyn FrameSource>, clients: Clients, ui: Arc<dyn Ui>) -> Self {
        Self {
            media,
            clients,
            ui,
            pacer: Arc::new(TokioPacer),
            pacing: DEFAULT_PACING,
            gate: ControlGate::new(),
            session: Mutex::new(Session::default()),
        }
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Snapshot of the current session state.
    pub fn session(&self) -> Session {
        self.lock_session().clone()
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open the camera. A no-op once the camera is running.
    pub async fn start_camera(&self) -> Result<(), MediaError> {
        if self.lock_session().camera_active {
            return Ok(());
        }
        if let Err(e) = self.media.acquire().await {
            tracing::error!(error = %e, "camera acquisition failed");
            self.ui.set_message(&e.to_string());
            return Err(e);
        }
        self.lock_session().camera_active = true;
        tracing::info!("camera started");
        Ok(())
    }

    /// Fetch and render the registered labels. Failures only show a placeholder.
    pub async fn refresh_registered_faces(&self) -> Option<RegisteredFaceSet> {
        registry::refresh(self.clients.registry.as_ref(), self.ui.as_ref()).await
    }

    /// Trigger model training, holding the controls for its duration.
    pub async fn train(&self) -> Result<TrainedModel, TrainError> {
        training::run_training(self.clients.trainer.as_ref(), &self.gate, self.ui.as_ref()).await
    }

    /// Collect `target` detected and stored frames for `label`.
    ///
    /// Precondition failures return `Err` before any network call. Once the
    /// loop starts, the run always ends in `Ok` with either a completed or a
    /// stopped summary.
    pub async fn run_capture(&self, label: &str, target: u32) -> Result<RunSummary, RunError> {
        let label = label.trim();
        if !self.lock_session().camera_active {
            return Err(RunError::CameraNotStarted);
        }
        if label.is_empty() {
            return Err(RunError::InvalidLabel);
        }
        if target == 0 {
            return Err(RunError::InvalidTarget);
        }

        let ui = self.ui.as_ref();
        let _controls = self.gate.try_acquire(ui).ok_or(RunError::Busy)?;

        self.lock_session().begin_run(label, target);
        tracing::info!(label, target, "capture run started");
        ui.set_message(&format!("Starting to capture {target} images for {label}..."));
        ui.set_progress(0, target);

        let mut last_error = None;
        for i in 0..target {
            let number = i + 1;
            ui.set_message(&format!(
                "Capturing image {number} of {target} for {label}..."
            ));

            match self.capture_step(label).await {
                Ok(step) => {
                    ui.capture_result(
                        number,
                        &CaptureResult::stored(&step.stored.filename, step.regions.len()),
                    );
                    let captured = self.lock_session().record_capture();
                    tracing::debug!(
                        captured,
                        target,
                        faces = step.regions.len(),
                        filename = %step.stored.filename,
                        "frame stored"
                    );
                    ui.set_progress(captured, target);
                    ui.draw_overlay(&Overlay::from_regions(&step.regions));
                    self.refresh_registered_faces().await;
                }
                Err(e) => {
                    let error = e.to_string();
                    tracing::warn!(image = number, error = %error, "capture step failed");
                    ui.capture_result(number, &CaptureResult::failed(&error));
                    ui.set_message(&format!(
                        "Capture failed for image {number}: {error}. Stopping capture."
                    ));
                    self.lock_session().stop(error.clone());
                    last_error = Some(error);
                    break;
                }
            }

            self.pacer.pause(self.pacing).await;
        }

        let (state, captured) = {
            let mut session = self.lock_session();
            (session.finish(), session.captured)
        };
        let (outcome, message) = match state {
            RunState::Completed => (
                RunOutcome::Completed,
                format!("Finished capturing {target} images for {label}."),
            ),
            _ => (
                RunOutcome::Stopped,
                format!("Stopped capturing. Captured {captured} / {target} images."),
            ),
        };
        tracing::info!(label, captured, target, ?outcome, "capture run finished");
        ui.set_message(&message);

        Ok(RunSummary {
            outcome,
            label: label.to_string(),
            captured,
            target,
            error: last_error,
            message,
        })
    }

    async fn capture_step(&self, label: &str) -> Result<StepOutput, StepError> {
        let frame = self.media.extract_frame().await?;
        let regions = self.clients.detector.detect(&frame).await?;
        if regions.is_empty() {
            return Err(DetectError::NoFaceDetected.into());
        }
        let stored = self.clients.persister.persist(&frame, &regions, label).await?;
        Ok(StepOutput { stored, regions })
    }
}
