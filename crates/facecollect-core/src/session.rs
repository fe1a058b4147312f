/// Number of frames collected per label unless the caller asks otherwise.
pub const DEFAULT_TARGET: u32 = 30;

/// Lifecycle of the most recent capture run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Stopped,
}

/// Mutable state of one collection session, owned by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub camera_active: bool,
    /// Label of the current or most recent run.
    pub label: Option<String>,
    pub captured: u32,
    pub target: u32,
    pub state: RunState,
    pub last_error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            camera_active: false,
            label: None,
            captured: 0,
            target: DEFAULT_TARGET,
            state: RunState::Idle,
            last_error: None,
        }
    }
}

impl Session {
    /// Reset counters for a new run. The only place `captured` goes back to zero.
    pub(crate) fn begin_run(&mut self, label: &str, target: u32) {
        self.label = Some(label.to_string());
        self.captured = 0;
        self.target = target;
        self.state = RunState::Running;
        self.last_error = None;
    }

    /// Count one stored frame and return the new total. Never exceeds `target`.
    pub(crate) fn record_capture(&mut self) -> u32 {
        if self.captured < self.target {
            self.captured += 1;
        }
        self.captured
    }

    pub(crate) fn stop(&mut self, error: String) {
        self.last_error = Some(error);
        self.state = RunState::Stopped;
    }

    /// Settle the terminal state once the loop has exited.
    pub(crate) fn finish(&mut self) -> RunState {
        self.state = if self.state == RunState::Running && self.captured == self.target {
            RunState::Completed
        } else {
            RunState::Stopped
        };
        self.state
    }
}

/// Progress line shown next to the capture control.
pub fn progress_text(captured: u32, target: u32) -> String {
    format!("Captured: {captured} / {target}")
}
