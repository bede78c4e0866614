use std::fmt;

use serde::{Deserialize, Serialize};

/// Session state reported by the agent.
///
/// The set of states is owned by the agent and open-ended ("Idle",
/// "Recording", "Transcribing", "Inserting", ...). The console carries the
/// value as an opaque string and special-cases only [`SessionState::RECORDING`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState(String);

impl SessionState {
    /// State reported while the agent is capturing audio.
    pub const RECORDING: &'static str = "Recording";
    /// State reported when no session is active.
    pub const IDLE: &'static str = "Idle";

    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    pub fn is_recording(&self) -> bool {
        self.0 == Self::RECORDING
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self(Self::IDLE.to_string())
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of the agent's live session.
///
/// Replaced wholesale on every status fetch and every `status_changed`
/// event; the agent always emits a complete snapshot, so partial merges
/// do not exist.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub state: SessionState,
    /// Last session-level failure reported by the agent, if any. The agent
    /// sends an explicit `null` when there is none.
    pub last_error: Option<String>,
}

impl SessionStatus {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: SessionState::new(state),
            last_error: None,
        }
    }
}

/// Response payload of the API-key presence probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyProbe {
    pub present: bool,
}

/// Whether the agent holds a transcription API key.
///
/// `Unknown` until the first successful reload answers the probe; never
/// user-editable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyPresence {
    #[default]
    Unknown,
    Present,
    Absent,
}

impl KeyPresence {
    pub fn from_probe(probe: KeyProbe) -> Self {
        if probe.present {
            KeyPresence::Present
        } else {
            KeyPresence::Absent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyPresence::Unknown => "unknown",
            KeyPresence::Present => "present",
            KeyPresence::Absent => "absent",
        }
    }
}

/// Whether the agent launches at login.
///
/// `Unknown` until a reload answers; updated optimistically after a
/// successful set command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AutostartState {
    #[default]
    Unknown,
    Enabled,
    Disabled,
}

impl AutostartState {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            AutostartState::Enabled
        } else {
            AutostartState::Disabled
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AutostartState::Unknown => "unknown",
            AutostartState::Enabled => "enabled",
            AutostartState::Disabled => "disabled",
        }
    }
}
