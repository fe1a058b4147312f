//! Mutual exclusion between capture runs and training.
//!
//! Holding a [`ControlGuard`] means the capture and train controls are
//! disabled. Dropping it re-enables them, whichever way the holder exits.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::ports::Ui;

#[derive(Debug, Default)]
pub struct ControlGate {
    busy: AtomicBool,
}

impl ControlGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the gate and disable the controls, or `None` if already held.
    pub fn try_acquire<'a>(&'a self, ui: &'a dyn Ui) -> Option<ControlGuard<'a>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        ui.set_controls_enabled(false);
        Some(ControlGuard { gate: self, ui })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Scoped hold on the [`ControlGate`].
pub struct ControlGuard<'a> {
    gate: &'a ControlGate,
    ui: &'a dyn Ui,
}

impl Drop for ControlGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
        self.ui.set_controls_enabled(true);
    }
}
