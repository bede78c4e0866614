//! HTTP implementation of the agent gateway.
//!
//! Commands are `POST {base}/commands/{name}` with a JSON request body and
//! a JSON response (`null` for commands that return nothing). Events are a
//! single `GET {base}/events` server-sent-events stream, fanned out to
//! subscribers over a broadcast channel. The stream is connected by a
//! background task that reconnects on loss; stream failures are logged and
//! never surfaced as user errors.

use std::time::Duration;

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use murmur_core::config::AgentConfig;
use murmur_core::error::{MurmurError, Result};
use murmur_core::events::AgentEvent;
use murmur_core::status::{KeyProbe, SessionStatus};

use crate::AgentGateway;

/// Capacity of the event fan-out channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Delay before reconnecting a lost event stream.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

#[derive(Serialize)]
struct SetConfigRequest {
    config: AgentConfig,
}

#[derive(Serialize)]
struct SetAutostartRequest {
    enabled: bool,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Gateway speaking the agent's HTTP command and SSE event surface.
///
/// Dropping the gateway aborts the event pump; receivers handed out by
/// [`AgentGateway::events`] observe the channel closing.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    event_tx: broadcast::Sender<AgentEvent>,
    pump: JoinHandle<()>,
}

impl HttpGateway {
    /// Connect a gateway to the agent at `base_url`.
    ///
    /// Spawns the event pump onto the current tokio runtime. The pump
    /// keeps retrying the event stream in the background, so construction
    /// succeeds even while the agent is down; commands report their own
    /// failures.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| MurmurError::Gateway(e.to_string()))?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let pump = tokio::spawn(pump_events(
            client.clone(),
            base_url.clone(),
            event_tx.clone(),
        ));
        Ok(Self {
            client,
            base_url,
            event_tx,
            pump,
        })
    }

    async fn command<B, R>(&self, name: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request_id = Uuid::new_v4();
        debug!(command = name, request_id = %request_id, "issuing agent command");

        let response = self
            .client
            .post(format!("{}/commands/{}", self.base_url, name))
            .json(body)
            .send()
            .await
            .map_err(|e| MurmurError::Gateway(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| MurmurError::Gateway(e.to_string()))?;

        if !status.is_success() {
            warn!(command = name, request_id = %request_id, status = %status, "agent command rejected");
            return Err(MurmurError::Gateway(error_message(status, &text)));
        }

        let payload = if text.trim().is_empty() { "null" } else { &text };
        Ok(serde_json::from_str(payload)?)
    }
}

impl AgentGateway for HttpGateway {
    async fn get_config(&self) -> Result<AgentConfig> {
        self.command("get_config", &serde_json::Value::Null).await
    }

    async fn check_api_key(&self) -> Result<KeyProbe> {
        self.command("check_api_key", &serde_json::Value::Null)
            .await
    }

    async fn get_status(&self) -> Result<SessionStatus> {
        self.command("get_status", &serde_json::Value::Null).await
    }

    async fn get_autostart_enabled(&self) -> Result<bool> {
        self.command("get_autostart_enabled", &serde_json::Value::Null)
            .await
    }

    async fn set_autostart_enabled(&self, enabled: bool) -> Result<()> {
        self.command("set_autostart_enabled", &SetAutostartRequest { enabled })
            .await
    }

    async fn set_config(&self, config: AgentConfig) -> Result<()> {
        self.command("set_config", &SetConfigRequest { config })
            .await
    }

    async fn reset_config(&self) -> Result<AgentConfig> {
        self.command("reset_config", &serde_json::Value::Null).await
    }

    async fn toggle_recording(&self) -> Result<()> {
        self.command("toggle_recording", &serde_json::Value::Null)
            .await
    }

    async fn test_transcription(&self) -> Result<String> {
        self.command("test_transcription", &serde_json::Value::Null)
            .await
    }

    fn events(&self) -> broadcast::Receiver<AgentEvent> {
        self.event_tx.subscribe()
    }
}

impl Drop for HttpGateway {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Extracts a display message from a rejected command response.
///
/// The agent replies with `{"error": "..."}`; anything else falls back to
/// the raw body, then to the status line.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Connects the agent's event stream and forwards decoded events for the
/// lifetime of the gateway. Reconnects after [`RECONNECT_DELAY`] on any
/// connection failure or stream end.
async fn pump_events(
    client: reqwest::Client,
    base_url: String,
    event_tx: broadcast::Sender<AgentEvent>,
) {
    let url = format!("{base_url}/events");
    loop {
        match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("agent event stream connected");
                let mut parser = SseParser::new();
                let mut stream = response.bytes_stream();
                while let Some(chunk) = stream.next().await {
                    match chunk {
                        Ok(bytes) => {
                            for frame in parser.feed(&bytes) {
                                dispatch_frame(&event_tx, frame);
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "agent event stream interrupted");
                            break;
                        }
                    }
                }
                debug!("agent event stream ended");
            }
            Ok(response) => {
                warn!(status = %response.status(), "agent event stream rejected");
            }
            Err(e) => {
                warn!(error = %e, "agent event stream connection failed");
            }
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

fn dispatch_frame(event_tx: &broadcast::Sender<AgentEvent>, frame: SseFrame) {
    match AgentEvent::from_wire(&frame.event, &frame.data) {
        Ok(Some(event)) => {
            debug!(event = event.event_name(), "agent event received");
            // Send only fails with no subscribers, which is fine.
            let _ = event_tx.send(event);
        }
        Ok(None) => {
            debug!(event = %frame.event, "ignoring unrecognized agent event");
        }
        Err(e) => {
            warn!(event = %frame.event, error = %e, "dropping malformed agent event");
        }
    }
}

// =============================================================================
// SSE framing
// =============================================================================

/// One decoded server-sent event.
#[derive(Debug, PartialEq, Eq)]
struct SseFrame {
    event: String,
    data: String,
}

/// Incremental parser for the server-sent-events wire format.
///
/// Bytes arrive in arbitrary chunks, so the parser buffers until complete
/// lines are available and emits a frame at each blank line. Multiple
/// `data:` lines concatenate with newlines; comment lines (keep-alives)
/// and unknown fields are skipped. The buffer stays raw bytes so chunk
/// boundaries inside multi-byte UTF-8 sequences cannot corrupt payloads.
struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    fn new() -> Self {
        Self {
            buffer: Vec::new(),
            event: None,
            data: Vec::new(),
        }
    }

    /// Feeds a chunk of bytes, returning every frame it completed.
    fn feed(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(bytes);
        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line_bytes[..line_bytes.len() - 1]);
            if let Some(frame) = self.take_line(line.trim_end_matches('\r')) {
                frames.push(frame);
            }
        }
        frames
    }

    fn take_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            if self.event.is_none() && self.data.is_empty() {
                return None;
            }
            return Some(SseFrame {
                // "message" is the protocol's default event type.
                event: self.event.take().unwrap_or_else(|| "message".to_string()),
                data: std::mem::take(&mut self.data).join("\n"),
            });
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id and retry are not used by this client.
            _ => {}
        }
        None
    }
}
