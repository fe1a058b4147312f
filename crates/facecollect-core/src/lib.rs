//! facecollect-core — Capture orchestration for face enrollment.
//!
//! Sequences detect → persist steps against a remote face backend,
//! tracks per-run session state and gates the capture/train controls.
//! All I/O lives behind the traits in [`ports`].

pub mod gate;
pub mod orchestrator;
pub mod overlay;
pub mod ports;
pub mod registry;
pub mod session;
pub mod training;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use gate::{ControlGate, ControlGuard};
pub use orchestrator::{CaptureOrchestrator, Clients, RunError, RunOutcome, RunSummary};
pub use overlay::{Overlay, OverlayBox};
pub use ports::{
    DetectError, Detector, FaceRegistry, FetchError, FrameSource, MediaError, Pacer,
    PersistError, Persister, TokioPacer, TrainError, Trainer, Ui,
};
pub use registry::RegisteredFaceSet;
pub use session::{progress_text, RunState, Session, DEFAULT_TARGET};
pub use types::{
    CaptureResult, EncodedImage, FaceRegion, FaceRegionError, Stored, TrainedModel,
    TransportError,
};
