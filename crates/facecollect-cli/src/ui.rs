//! Line-oriented terminal rendering of the collection UI.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use facecollect_core::{progress_text, CaptureResult, Overlay, Ui};

/// Writes status, progress and overlays as plain lines.
///
/// The registered-face list is only reprinted when it changes, since the
/// capture loop refreshes it after every stored frame.
pub struct TerminalUi<W> {
    out: Mutex<W>,
    last_registered: Mutex<Option<String>>,
}

impl TerminalUi<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalUi<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            last_registered: Mutex::new(None),
        }
    }

    fn line(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{text}").and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Ui for TerminalUi<W> {
    fn set_message(&self, text: &str) {
        self.line(text);
    }

    fn set_progress(&self, captured: u32, target: u32) {
        self.line(&progress_text(captured, target));
    }

    fn draw_overlay(&self, overlay: &Overlay) {
        for b in &overlay.boxes {
            self.line(&format!(
                "  [{}] at ({:.0}, {:.0}) size {:.0}x{:.0}",
                b.caption, b.x, b.y, b.width, b.height
            ));
        }
    }

    fn set_registered_faces(&self, text: &str) {
        {
            let mut last = self
                .last_registered
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if last.as_deref() == Some(text) {
                return;
            }
            *last = Some(text.to_string());
        }
        self.line(&format!("Registered Faces: {text}"));
    }

    fn set_controls_enabled(&self, enabled: bool) {
        tracing::debug!(enabled, "controls");
    }

    fn capture_result(&self, index: u32, result: &CaptureResult) {
        tracing::debug!(
            image = index,
            success = result.success,
            filename = result.filename.as_deref().unwrap_or(""),
            "capture step result"
        );
    }
}
