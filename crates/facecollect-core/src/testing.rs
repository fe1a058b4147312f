//! In-memory stand-ins for the camera, backend, clock and UI.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::overlay::Overlay;
use crate::ports::{
    DetectError, Detector, FaceRegistry, FetchError, FrameSource, MediaError, Pacer, PersistError,
    Persister, TrainError, Trainer, Ui,
};
use crate::registry::RegisteredFaceSet;
use crate::types::{CaptureResult, EncodedImage, FaceRegion, Stored, TrainedModel};

pub fn face(name: &str, confidence: f64) -> FaceRegion {
    FaceRegion::new(100.0, 80.0, 220.0, 230.0, name, confidence)
}

#[derive(Default)]
pub struct FakeMedia {
    acquisitions: AtomicUsize,
    frames: AtomicUsize,
    acquire_error: Mutex<Option<MediaError>>,
    frame_error: Mutex<Option<MediaError>>,
}

impl FakeMedia {
    pub fn fail_acquire_with(&self, error: MediaError) {
        *self.acquire_error.lock().unwrap() = Some(error);
    }

    pub fn fail_frames_with(&self, error: MediaError) {
        *self.frame_error.lock().unwrap() = Some(error);
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Frames successfully handed out.
    pub fn frames(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameSource for FakeMedia {
    async fn acquire(&self) -> Result<(), MediaError> {
        if let Some(e) = self.acquire_error.lock().unwrap().clone() {
            return Err(e);
        }
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn extract_frame(&self) -> Result<EncodedImage, MediaError> {
        if let Some(e) = self.frame_error.lock().unwrap().clone() {
            return Err(e);
        }
        let n = self.frames.fetch_add(1, Ordering::SeqCst);
        Ok(EncodedImage::from_base64(format!("frame-{n}")))
    }
}

/// Returns the same regions on every call, except for one scripted failure.
pub struct ScriptedDetector {
    regions: Vec<FaceRegion>,
    fail_at: Option<(usize, DetectError)>,
    calls: AtomicUsize,
}

impl ScriptedDetector {
    pub fn always(regions: Vec<FaceRegion>) -> Self {
        Self {
            regions,
            fail_at: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail the call with zero-based index `call`.
    pub fn failing_at(mut self, call: usize, error: DetectError) -> Self {
        self.fail_at = Some((call, error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Detector for ScriptedDetector {
    async fn detect(&self, _frame: &EncodedImage) -> Result<Vec<FaceRegion>, DetectError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_at {
            Some((at, e)) if *at == call => Err(e.clone()),
            _ => Ok(self.regions.clone()),
        }
    }
}

#[derive(Default)]
pub struct ScriptedPersister {
    fail_at: Option<(usize, PersistError)>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, usize)>>,
}

impl ScriptedPersister {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn failing_at(mut self, call: usize, error: PersistError) -> Self {
        self.fail_at = Some((call, error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Labels of the stored frames, in order.
    pub fn labels(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|(l, _)| l.clone()).collect()
    }

    /// Detection count sent with each stored frame.
    pub fn detections_seen(&self) -> Vec<usize> {
        self.seen.lock().unwrap().iter().map(|(_, n)| *n).collect()
    }
}

#[async_trait]
impl Persister for ScriptedPersister {
    async fn persist(
        &self,
        _frame: &EncodedImage,
        detections: &[FaceRegion],
        label: &str,
    ) -> Result<Stored, PersistError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((at, e)) = &self.fail_at {
            if *at == call {
                return Err(e.clone());
            }
        }
        self.seen
            .lock()
            .unwrap()
            .push((label.to_string(), detections.len()));
        Ok(Stored {
            filename: format!("{label}_{call:03}.jpg"),
        })
    }
}

pub struct FakeTrainer {
    result: Result<TrainedModel, TrainError>,
    calls: AtomicUsize,
}

impl FakeTrainer {
    pub fn succeeding(model_path: &str) -> Self {
        Self {
            result: Ok(TrainedModel {
                model_path: model_path.into(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: TrainError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Trainer for FakeTrainer {
    async fn train(&self) -> Result<TrainedModel, TrainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub struct FakeRegistry {
    result: Result<RegisteredFaceSet, FetchError>,
    calls: AtomicUsize,
}

impl FakeRegistry {
    pub fn with<const N: usize>(entries: [(&str, i64); N]) -> Self {
        Self {
            result: Ok(entries.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FaceRegistry for FakeRegistry {
    async fn fetch(&self) -> Result<RegisteredFaceSet, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Counts pauses without sleeping. Can be told to park the loop inside a pause.
#[derive(Default)]
pub struct InstantPacer {
    pauses: AtomicUsize,
    blocked: AtomicBool,
    paused: Notify,
    release: Notify,
}

impl InstantPacer {
    pub fn pauses(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }

    pub fn block(&self) {
        self.blocked.store(true, Ordering::SeqCst);
    }

    pub fn unblock(&self) {
        self.blocked.store(false, Ordering::SeqCst);
        self.release.notify_one();
    }

    pub async fn wait_until_paused(&self) {
        self.paused.notified().await;
    }
}

#[async_trait]
impl Pacer for InstantPacer {
    async fn pause(&self, _interval: Duration) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
        if self.blocked.load(Ordering::SeqCst) {
            self.paused.notify_one();
            self.release.notified().await;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Message(String),
    Progress(u32, u32),
    Overlay(usize),
    Registered(String),
    Controls(bool),
    Result(u32, CaptureResult),
}

#[derive(Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUi {
    fn push(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Message(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn progress(&self) -> Vec<(u32, u32)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Progress(c, t) => Some((c, t)),
                _ => None,
            })
            .collect()
    }

    /// Box count of each drawn overlay.
    pub fn overlays(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Overlay(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn registered(&self) -> Vec<UiEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, UiEvent::Registered(_)))
            .collect()
    }

    pub fn controls(&self) -> Vec<UiEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, UiEvent::Controls(_)))
            .collect()
    }

    pub fn results(&self) -> Vec<(u32, CaptureResult)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Result(i, r) => Some((i, r)),
                _ => None,
            })
            .collect()
    }
}

impl Ui for RecordingUi {
    fn set_message(&self, text: &str) {
        self.push(UiEvent::Message(text.to_string()));
    }

    fn set_progress(&self, captured: u32, target: u32) {
        self.push(UiEvent::Progress(captured, target));
    }

    fn draw_overlay(&self, overlay: &Overlay) {
        self.push(UiEvent::Overlay(overlay.boxes.len()));
    }

    fn set_registered_faces(&self, text: &str) {
        self.push(UiEvent::Registered(text.to_string()));
    }

    fn set_controls_enabled(&self, enabled: bool) {
        self.push(UiEvent::Controls(enabled));
    }

    fn capture_result(&self, index: u32, result: &CaptureResult) {
        self.push(UiEvent::Result(index, result.clone()));
    }
}
