//! Read-only view of the agent's session status.
//!
//! The view holds whatever status the agent reported most recently, whether
//! that arrived as a command response or as a pushed `status_changed` event.
//! Writers replace the whole value; there is no merging of individual
//! fields, so the view never mixes two reports.

use std::sync::Mutex;

use murmur_core::SessionStatus;

/// Label for the recording control when the agent is idle.
pub const ACTION_START: &str = "Start";
/// Label for the recording control when the agent is recording.
pub const ACTION_STOP: &str = "Stop";

/// Thread-safe holder for the latest reported session status.
#[derive(Debug)]
pub struct StatusView {
    status: Mutex<SessionStatus>,
}

impl Default for StatusView {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusView {
    /// Create a view reporting the idle status.
    pub fn new() -> Self {
        Self {
            status: Mutex::new(SessionStatus::default()),
        }
    }

    /// Returns a copy of the latest status.
    pub fn get(&self) -> SessionStatus {
        self.status.lock().expect("status mutex poisoned").clone()
    }

    /// Replace the stored status wholesale.
    pub fn replace(&self, status: SessionStatus) {
        let mut guard = self.status.lock().expect("status mutex poisoned");
        *guard = status;
    }

    /// Label for the primary recording control.
    ///
    /// Only the exact `Recording` state flips the label to [`ACTION_STOP`];
    /// every other state, including ones this client has never heard of,
    /// reads as startable.
    pub fn primary_action(&self) -> &'static str {
        if self.get().state.is_recording() {
            ACTION_STOP
        } else {
            ACTION_START
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
