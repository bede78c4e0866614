//! Agent gateway - the command and event boundary to the dictation agent.
//!
//! Defines the [`AgentGateway`] trait consumed by the console, an HTTP
//! implementation speaking the agent's command/SSE surface, and an
//! in-memory mock for tests and offline runs.

use std::future::Future;

use tokio::sync::broadcast;

use murmur_core::config::AgentConfig;
use murmur_core::error::Result;
use murmur_core::events::AgentEvent;
use murmur_core::status::{KeyProbe, SessionStatus};

pub mod http;
pub mod mock;

pub use http::HttpGateway;
pub use mock::MockGateway;

/// Command and event surface of the dictation agent.
///
/// Nine request/response commands; every failure is reduced to an opaque
/// display string carried in `MurmurError::Gateway`. `events()` hands out
/// an independent receiver of the agent's push stream, which outlives any
/// in-flight command and is never blocked by one.
pub trait AgentGateway: Send + Sync {
    /// Fetch the persisted agent configuration.
    fn get_config(&self) -> impl Future<Output = Result<AgentConfig>> + Send;

    /// Probe whether a transcription API key is configured.
    fn check_api_key(&self) -> impl Future<Output = Result<KeyProbe>> + Send;

    /// Fetch the current session status.
    fn get_status(&self) -> impl Future<Output = Result<SessionStatus>> + Send;

    /// Fetch whether the agent launches at login.
    fn get_autostart_enabled(&self) -> impl Future<Output = Result<bool>> + Send;

    /// Enable or disable launch at login.
    fn set_autostart_enabled(&self, enabled: bool) -> impl Future<Output = Result<()>> + Send;

    /// Persist a full configuration record. The agent is authoritative for
    /// validation; the console sends whatever the draft holds.
    fn set_config(&self, config: AgentConfig) -> impl Future<Output = Result<()>> + Send;

    /// Restore the agent's default configuration and return it.
    fn reset_config(&self) -> impl Future<Output = Result<AgentConfig>> + Send;

    /// Start or stop recording. The response carries no state; the
    /// resulting session state arrives later as a `status_changed` event.
    fn toggle_recording(&self) -> impl Future<Output = Result<()>> + Send;

    /// Run a transcription connectivity test and return the transcript.
    fn test_transcription(&self) -> impl Future<Output = Result<String>> + Send;

    /// Subscribe to the agent's push events.
    fn events(&self) -> broadcast::Receiver<AgentEvent>;
}
