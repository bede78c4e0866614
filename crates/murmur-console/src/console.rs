//! Operation coordinator driving the agent gateway.
//!
//! The `Console` owns the shared [`ConsoleState`] and issues gateway
//! commands on behalf of the user. Operations never return errors to the
//! caller; every outcome lands in the state cells, where the error slot
//! carries the failure description and the busy flags report progress.
//!
//! Reloads and transcription tests are sequence-numbered: each issue claims
//! a fresh token, and a completion applies its results only while its token
//! is still the newest in its category. A completion that finds itself
//! superseded changes nothing. Pushed events are never sequence-checked;
//! between an event and a command completion, whichever write lands last
//! wins.
//!
//! Nothing here cancels an in-flight command and nothing imposes a
//! client-side deadline; a command that was issued runs to completion and
//! is judged stale, not abandoned.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use murmur_core::status::{AutostartState, KeyPresence};
use murmur_core::{AgentConfig, AgentEvent, KeyProbe, Result, SessionStatus};
use murmur_gateway::AgentGateway;

use crate::state::ConsoleState;

/// Coordinates gateway commands and pushed events over shared state.
pub struct Console<G> {
    state: Arc<ConsoleState>,
    gateway: Arc<G>,
    pump: JoinHandle<()>,
}

impl<G: AgentGateway> Console<G> {
    /// Create a console over the given gateway.
    ///
    /// Must be called from within a Tokio runtime: the console spawns a
    /// background task that applies pushed agent events to the state for
    /// the console's whole lifetime. Dropping the console stops the task.
    pub fn new(gateway: Arc<G>) -> Self {
        let state = Arc::new(ConsoleState::new());
        let events = gateway.events();
        let pump = tokio::spawn(pump_events(events, Arc::clone(&state)));
        Self {
            state,
            gateway,
            pump,
        }
    }

    /// The state cells this console writes to.
    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    /// Synchronize every state cell from the agent.
    ///
    /// Clears both message slots, raises `loading`, and issues the
    /// configuration fetch, API-key probe, and status fetch concurrently.
    /// All three run to completion and their results are applied only as a
    /// complete set; if any failed, the error slot carries the first
    /// failure in issue order and no cell changes. The autostart probe runs
    /// afterwards, never concurrently with the main set, and its failure
    /// is surfaced without disturbing the already-applied cells.
    pub async fn reload(&self) {
        let token = self.state.next_reload_token();
        self.state.clear_error();
        self.state.clear_transcript();
        self.state.set_loading(true);
        debug!(token, "reload issued");

        let (config, key, status) = tokio::join!(
            self.gateway.get_config(),
            self.gateway.check_api_key(),
            self.gateway.get_status(),
        );

        match complete_set(config, key, status) {
            Ok((config, key, status)) => {
                if self.state.reload_is_current(token) {
                    self.state.draft().replace(config);
                    self.state.set_key_presence(KeyPresence::from_probe(key));
                    self.state.view().replace(status);
                }
                match self.gateway.get_autostart_enabled().await {
                    Ok(enabled) => {
                        if self.state.reload_is_current(token) {
                            self.state
                                .set_autostart_state(AutostartState::from_enabled(enabled));
                        }
                    }
                    Err(e) => {
                        if self.state.reload_is_current(token) {
                            self.state.set_error(e.to_string());
                        }
                    }
                }
            }
            Err(e) => {
                if self.state.reload_is_current(token) {
                    self.state.set_error(e.to_string());
                }
            }
        }

        if self.state.reload_is_current(token) {
            self.state.set_loading(false);
        } else {
            debug!(token, "superseded reload discarded");
        }
    }

    /// Persist the current draft wholesale.
    ///
    /// The draft is cloned at issue and sent as-is; the agent's response is
    /// never reconciled back into the draft, so on failure the user's edits
    /// stay in place for correction and retry. `saving` drops when the
    /// command settles, success or not.
    pub async fn save(&self) {
        self.state.clear_error();
        self.state.clear_transcript();
        self.state.set_saving(true);

        let config = AgentConfig::clone(&self.state.draft().get());
        debug!("saving configuration draft");

        if let Err(e) = self.gateway.set_config(config).await {
            self.state.set_error(e.to_string());
        }
        self.state.set_saving(false);
    }

    /// Restore the agent's built-in default configuration.
    ///
    /// Clears both outcome slots, then asks the agent for its defaults. On
    /// success the returned defaults replace the draft, discarding any
    /// pending edits. On failure the draft keeps them.
    pub async fn reset(&self) {
        self.state.clear_error();
        self.state.clear_transcript();
        match self.gateway.reset_config().await {
            Ok(config) => self.state.draft().replace(config),
            Err(e) => self.state.set_error(e.to_string()),
        }
    }

    /// Run a short transcription round trip against the agent.
    ///
    /// Not gated by the busy flags; tests may be issued in rapid
    /// succession, and only the newest one's completion lands in the
    /// transcript or error slot.
    pub async fn test(&self) {
        let token = self.state.next_test_token();
        self.state.clear_error();
        self.state.clear_transcript();
        debug!(token, "transcription test issued");

        let result = self.gateway.test_transcription().await;
        if !self.state.test_is_current(token) {
            debug!(token, "superseded transcription test discarded");
            return;
        }
        match result {
            Ok(text) => self.state.set_transcript(text),
            Err(e) => self.state.set_error(e.to_string()),
        }
    }

    /// Ask the agent to start or stop recording.
    ///
    /// Fire-and-forget: a success response confirms only that the agent
    /// accepted the request. The new session state arrives later through a
    /// `status_changed` event, never through this call.
    pub async fn toggle_recording(&self) {
        self.state.clear_error();
        if let Err(e) = self.gateway.toggle_recording().await {
            self.state.set_error(e.to_string());
        }
    }

    /// Enable or disable launching the agent at session start.
    ///
    /// The tri-state flips to the requested value only on success; on
    /// failure it keeps whatever it showed before.
    pub async fn set_autostart(&self, enabled: bool) {
        self.state.clear_error();
        match self.gateway.set_autostart_enabled(enabled).await {
            Ok(()) => self
                .state
                .set_autostart_state(AutostartState::from_enabled(enabled)),
            Err(e) => self.state.set_error(e.to_string()),
        }
    }
}

impl<G> Drop for Console<G> {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Collapse the three reload probes, keeping the first failure in issue
/// order.
fn complete_set(
    config: Result<AgentConfig>,
    key: Result<KeyProbe>,
    status: Result<SessionStatus>,
) -> Result<(AgentConfig, KeyProbe, SessionStatus)> {
    Ok((config?, key?, status?))
}

/// Apply pushed agent events to the state until the channel closes.
async fn pump_events(mut events: broadcast::Receiver<AgentEvent>, state: Arc<ConsoleState>) {
    loop {
        match events.recv().await {
            Ok(AgentEvent::StatusChanged { status }) => {
                debug!(state = %status.state, "status event applied");
                state.view().replace(status);
            }
            Ok(AgentEvent::TranscriptReady { text }) => {
                debug!(text_len = text.len(), "transcript event applied");
                state.set_transcript(text);
            }
            Ok(AgentEvent::Error { message }) => {
                state.set_error(message);
            }
            Ok(event) => {
                debug!(event = event.event_name(), "unhandled agent event");
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "event stream lagged; continuing");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("event channel closed; event pump stopping");
                break;
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
