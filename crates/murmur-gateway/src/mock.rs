//! In-memory agent gateway for tests and offline runs.

use std::collections::HashSet;
use std::sync::Mutex;

use tokio::sync::broadcast;
use tracing::debug;

use murmur_core::config::AgentConfig;
use murmur_core::error::{MurmurError, Result};
use murmur_core::events::AgentEvent;
use murmur_core::status::{KeyProbe, SessionState, SessionStatus};

use crate::AgentGateway;

/// Capacity of the event fan-out channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Simulated agent holding its own configuration and session state.
///
/// Commands act on the in-memory state the way the real agent would:
/// `toggle_recording` flips the session between Idle and Recording and
/// emits the matching `status_changed` event, `reset_config` restores
/// defaults, `set_config` enforces the agent-side `maxSeconds >= 1` rule.
/// Tests can arrange state with the setters, inject one-shot command
/// failures with [`fail_next`], and push arbitrary events with [`emit`].
///
/// [`fail_next`]: MockGateway::fail_next
/// [`emit`]: MockGateway::emit
pub struct MockGateway {
    config: Mutex<AgentConfig>,
    status: Mutex<SessionStatus>,
    autostart: Mutex<bool>,
    key_present: Mutex<bool>,
    transcript: Mutex<String>,
    failures: Mutex<HashSet<String>>,
    event_tx: broadcast::Sender<AgentEvent>,
}

impl MockGateway {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config: Mutex::new(AgentConfig::default()),
            status: Mutex::new(SessionStatus::default()),
            autostart: Mutex::new(false),
            key_present: Mutex::new(true),
            transcript: Mutex::new("[mock transcript]".to_string()),
            failures: Mutex::new(HashSet::new()),
            event_tx,
        }
    }

    /// Sets the answer of the API-key probe.
    pub fn set_key_present(&self, present: bool) {
        *self.key_present.lock().expect("key mutex poisoned") = present;
    }

    /// Sets the transcript returned by `test_transcription`.
    pub fn set_transcript(&self, transcript: impl Into<String>) {
        *self.transcript.lock().expect("transcript mutex poisoned") = transcript.into();
    }

    /// Replaces the session status without emitting an event.
    pub fn set_status(&self, status: SessionStatus) {
        *self.status.lock().expect("status mutex poisoned") = status;
    }

    /// Makes the next invocation of `command` fail with an injected error.
    pub fn fail_next(&self, command: &str) {
        self.failures
            .lock()
            .expect("failures mutex poisoned")
            .insert(command.to_string());
    }

    /// Pushes an event to all subscribers.
    pub fn emit(&self, event: AgentEvent) {
        let _ = self.event_tx.send(event);
    }

    fn take_failure(&self, command: &str) -> Result<()> {
        let mut failures = self.failures.lock().expect("failures mutex poisoned");
        if failures.remove(command) {
            return Err(MurmurError::Gateway(format!(
                "injected {command} failure"
            )));
        }
        Ok(())
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentGateway for MockGateway {
    async fn get_config(&self) -> Result<AgentConfig> {
        self.take_failure("get_config")?;
        Ok(self.config.lock().expect("config mutex poisoned").clone())
    }

    async fn check_api_key(&self) -> Result<KeyProbe> {
        self.take_failure("check_api_key")?;
        Ok(KeyProbe {
            present: *self.key_present.lock().expect("key mutex poisoned"),
        })
    }

    async fn get_status(&self) -> Result<SessionStatus> {
        self.take_failure("get_status")?;
        Ok(self.status.lock().expect("status mutex poisoned").clone())
    }

    async fn get_autostart_enabled(&self) -> Result<bool> {
        self.take_failure("get_autostart_enabled")?;
        Ok(*self.autostart.lock().expect("autostart mutex poisoned"))
    }

    async fn set_autostart_enabled(&self, enabled: bool) -> Result<()> {
        self.take_failure("set_autostart_enabled")?;
        *self.autostart.lock().expect("autostart mutex poisoned") = enabled;
        Ok(())
    }

    async fn set_config(&self, config: AgentConfig) -> Result<()> {
        self.take_failure("set_config")?;
        if config.recording.max_seconds < 1 {
            return Err(MurmurError::Gateway(
                "maxSeconds must be at least 1".to_string(),
            ));
        }
        *self.config.lock().expect("config mutex poisoned") = config;
        Ok(())
    }

    async fn reset_config(&self) -> Result<AgentConfig> {
        self.take_failure("reset_config")?;
        let defaults = AgentConfig::default();
        *self.config.lock().expect("config mutex poisoned") = defaults.clone();
        Ok(defaults)
    }

    async fn toggle_recording(&self) -> Result<()> {
        self.take_failure("toggle_recording")?;
        let next = {
            let mut status = self.status.lock().expect("status mutex poisoned");
            let state = if status.state.is_recording() {
                SessionState::IDLE
            } else {
                SessionState::RECORDING
            };
            *status = SessionStatus::new(state);
            status.clone()
        };
        debug!(state = %next.state, "mock session toggled");
        let _ = self.event_tx.send(AgentEvent::StatusChanged { status: next });
        Ok(())
    }

    async fn test_transcription(&self) -> Result<String> {
        self.take_failure("test_transcription")?;
        Ok(self
            .transcript
            .lock()
            .expect("transcript mutex poisoned")
            .clone())
    }

    fn events(&self) -> broadcast::Receiver<AgentEvent> {
        self.event_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_config_round_trip() {
        let gateway = MockGateway::new();
        let mut config = gateway.get_config().await.unwrap();
        assert_eq!(config, AgentConfig::default());

        config.thresholds.hold_ms = 250;
        gateway.set_config(config.clone()).await.unwrap();
        assert_eq!(gateway.get_config().await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let gateway = MockGateway::new();
        let mut config = AgentConfig::default();
        config.azure.endpoint = "https://somewhere".to_string();
        gateway.set_config(config).await.unwrap();

        let defaults = gateway.reset_config().await.unwrap();
        assert_eq!(defaults, AgentConfig::default());
        assert_eq!(gateway.get_config().await.unwrap(), AgentConfig::default());
    }

    #[tokio::test]
    async fn test_set_config_rejects_zero_max_seconds() {
        let gateway = MockGateway::new();
        let mut config = AgentConfig::default();
        config.recording.max_seconds = 0;

        let err = gateway.set_config(config).await.unwrap_err();
        assert!(err.to_string().contains("maxSeconds"));
        // The stored config is untouched.
        assert_eq!(
            gateway.get_config().await.unwrap().recording.max_seconds,
            120
        );
    }

    #[tokio::test]
    async fn test_toggle_flips_state_and_emits_event() {
        let gateway = MockGateway::new();
        let mut events = gateway.events();

        gateway.toggle_recording().await.unwrap();
        assert!(gateway.get_status().await.unwrap().state.is_recording());
        match events.recv().await.unwrap() {
            AgentEvent::StatusChanged { status } => assert!(status.state.is_recording()),
            other => panic!("expected StatusChanged, got {other:?}"),
        }

        gateway.toggle_recording().await.unwrap();
        assert!(!gateway.get_status().await.unwrap().state.is_recording());
        match events.recv().await.unwrap() {
            AgentEvent::StatusChanged { status } => assert!(!status.state.is_recording()),
            other => panic!("expected StatusChanged, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fail_next_is_one_shot() {
        let gateway = MockGateway::new();
        gateway.fail_next("test_transcription");

        let err = gateway.test_transcription().await.unwrap_err();
        assert!(err.to_string().contains("test_transcription"));

        // The failure is consumed; the next call succeeds.
        assert_eq!(
            gateway.test_transcription().await.unwrap(),
            "[mock transcript]"
        );
    }

    #[tokio::test]
    async fn test_key_probe_reflects_setting() {
        let gateway = MockGateway::new();
        assert!(gateway.check_api_key().await.unwrap().present);
        gateway.set_key_present(false);
        assert!(!gateway.check_api_key().await.unwrap().present);
    }

    #[tokio::test]
    async fn test_autostart_round_trip() {
        let gateway = MockGateway::new();
        assert!(!gateway.get_autostart_enabled().await.unwrap());
        gateway.set_autostart_enabled(true).await.unwrap();
        assert!(gateway.get_autostart_enabled().await.unwrap());
    }

    #[tokio::test]
    async fn test_emit_reaches_subscribers() {
        let gateway = MockGateway::new();
        let mut events = gateway.events();
        gateway.emit(AgentEvent::TranscriptReady {
            text: "pushed".to_string(),
        });
        assert_eq!(
            events.recv().await.unwrap(),
            AgentEvent::TranscriptReady {
                text: "pushed".to_string()
            }
        );
    }
}
