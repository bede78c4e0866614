use crate::error::Result;
use crate::status::SessionStatus;

/// Push events emitted by the agent over its event stream.
///
/// Events are unsolicited and uncorrelated with any in-flight command. On
/// the wire each event is a name plus a bare JSON payload; [`from_wire`]
/// and [`payload_json`] convert between the two forms.
///
/// [`from_wire`]: AgentEvent::from_wire
/// [`payload_json`]: AgentEvent::payload_json
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum AgentEvent {
    /// The agent's session status changed.
    StatusChanged { status: SessionStatus },
    /// A transcription finished (live dictation or connectivity test).
    TranscriptReady { text: String },
    /// The agent reported a failure outside any command.
    Error { message: String },
}

impl AgentEvent {
    /// Returns the wire name of the event, used for stream routing and logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            AgentEvent::StatusChanged { .. } => "status_changed",
            AgentEvent::TranscriptReady { .. } => "transcript_ready",
            AgentEvent::Error { .. } => "error",
        }
    }

    /// Decodes a named wire event.
    ///
    /// Returns `Ok(None)` for event names this console does not consume,
    /// so new agent-side events never break the stream.
    pub fn from_wire(name: &str, payload: &str) -> Result<Option<AgentEvent>> {
        let event = match name {
            "status_changed" => AgentEvent::StatusChanged {
                status: serde_json::from_str(payload)?,
            },
            "transcript_ready" => AgentEvent::TranscriptReady {
                text: serde_json::from_str(payload)?,
            },
            "error" => AgentEvent::Error {
                message: serde_json::from_str(payload)?,
            },
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    /// Encodes the event payload as wire JSON.
    pub fn payload_json(&self) -> Result<String> {
        let json = match self {
            AgentEvent::StatusChanged { status } => serde_json::to_string(status)?,
            AgentEvent::TranscriptReady { text } => serde_json::to_string(text)?,
            AgentEvent::Error { message } => serde_json::to_string(message)?,
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::SessionState;

    #[test]
    fn test_event_name() {
        let event = AgentEvent::TranscriptReady {
            text: "hello".to_string(),
        };
        assert_eq!(event.event_name(), "transcript_ready");

        let event = AgentEvent::StatusChanged {
            status: SessionStatus::default(),
        };
        assert_eq!(event.event_name(), "status_changed");

        let event = AgentEvent::Error {
            message: "boom".to_string(),
        };
        assert_eq!(event.event_name(), "error");
    }

    #[test]
    fn test_status_changed_from_wire() {
        let event = AgentEvent::from_wire("status_changed", r#"{"state":"Recording"}"#)
            .unwrap()
            .unwrap();
        match event {
            AgentEvent::StatusChanged { status } => {
                assert!(status.state.is_recording());
                assert!(status.last_error.is_none());
            }
            other => panic!("expected StatusChanged, got {other:?}"),
        }
    }

    #[test]
    fn test_transcript_ready_from_wire() {
        let event = AgentEvent::from_wire("transcript_ready", r#""dictated text""#)
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            AgentEvent::TranscriptReady {
                text: "dictated text".to_string()
            }
        );
    }

    #[test]
    fn test_error_from_wire() {
        let event = AgentEvent::from_wire("error", r#""device lost""#)
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            AgentEvent::Error {
                message: "device lost".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_event_name_is_skipped() {
        let event = AgentEvent::from_wire("level_meter", "0.7").unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        let result = AgentEvent::from_wire("status_changed", "not json");
        assert!(result.is_err());
    }

    #[test]
    fn test_wire_round_trip() {
        let events = vec![
            AgentEvent::StatusChanged {
                status: SessionStatus {
                    state: SessionState::new("Transcribing"),
                    last_error: Some("retrying".to_string()),
                },
            },
            AgentEvent::TranscriptReady {
                text: "hello world".to_string(),
            },
            AgentEvent::Error {
                message: "no api key".to_string(),
            },
        ];

        for event in events {
            let payload = event.payload_json().unwrap();
            let back = AgentEvent::from_wire(event.event_name(), &payload)
                .unwrap()
                .unwrap();
            assert_eq!(back, event);
        }
    }
}
