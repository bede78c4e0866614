use serde::{Deserialize, Serialize};

/// Agent configuration as exchanged over the command surface.
///
/// This is the wire model: field names serialize in camelCase to match the
/// agent's JSON contract, and every section tolerates missing fields by
/// falling back to the agent's canonical defaults. The console edits a
/// draft copy of this record and sends the whole record back on save; it
/// never persists it locally.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentConfig {
    pub azure: AzureConfig,
    pub hotkey: HotkeyConfig,
    pub thresholds: ThresholdConfig,
    pub recording: RecordingConfig,
    pub insert: InsertConfig,
}

/// Azure OpenAI transcription endpoint settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AzureConfig {
    /// Base URL of the Azure OpenAI resource.
    pub endpoint: String,
    /// Deployment name of the transcription model.
    pub deployment: String,
    /// API version sent with each transcription request.
    pub api_version: String,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            deployment: String::new(),
            api_version: "2025-03-01-preview".to_string(),
        }
    }
}

/// Global hotkey bindings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotkeyConfig {
    /// Hotkey chord on Windows.
    pub windows: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            windows: "Ctrl".to_string(),
        }
    }
}

/// Hotkey press-pattern thresholds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThresholdConfig {
    /// Milliseconds a key must be held to count as a hold.
    pub hold_ms: u64,
    /// Maximum milliseconds between presses to count as a double click.
    pub double_click_ms: u64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            hold_ms: 180,
            double_click_ms: 300,
        }
    }
}

/// Recording session limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordingConfig {
    /// Maximum recording duration in seconds. The agent rejects values
    /// below 1 on save; the console does not clamp.
    pub max_seconds: u64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self { max_seconds: 120 }
    }
}

/// Transcript insertion behavior.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InsertConfig {
    /// Restore the previous clipboard contents after paste insertion.
    pub restore_clipboard: bool,
    /// Text appended after the inserted transcript.
    pub postfix: InsertPostfix,
}

impl Default for InsertConfig {
    fn default() -> Self {
        Self {
            restore_clipboard: true,
            postfix: InsertPostfix::None,
        }
    }
}

/// Recognized postfix values for transcript insertion.
///
/// Closed set with a single value today; the agent may grow alternatives
/// (space, newline) without the console treating them specially.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsertPostfix {
    /// Insert the transcript verbatim.
    #[default]
    None,
}

impl InsertPostfix {
    /// Returns the wire name of the value.
    pub fn as_str(&self) -> &'static str {
        match self {
            InsertPostfix::None => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.azure.endpoint, "");
        assert_eq!(config.azure.deployment, "");
        assert_eq!(config.azure.api_version, "2025-03-01-preview");
        assert_eq!(config.hotkey.windows, "Ctrl");
        assert_eq!(config.thresholds.hold_ms, 180);
        assert_eq!(config.thresholds.double_click_ms, 300);
        assert_eq!(config.recording.max_seconds, 120);
        assert!(config.insert.restore_clipboard);
        assert_eq!(config.insert.postfix, InsertPostfix::None);
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let config = AgentConfig::default();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["azure"]["apiVersion"], "2025-03-01-preview");
        assert_eq!(json["thresholds"]["holdMs"], 180);
        assert_eq!(json["thresholds"]["doubleClickMs"], 300);
        assert_eq!(json["recording"]["maxSeconds"], 120);
        assert_eq!(json["insert"]["restoreClipboard"], true);
        assert_eq!(json["insert"]["postfix"], "none");
    }

    #[test]
    fn test_deserialize_full_wire_payload() {
        let json = r#"{
            "azure": {
                "endpoint": "https://example.openai.azure.com",
                "deployment": "whisper-large",
                "apiVersion": "2024-06-01"
            },
            "hotkey": { "windows": "Ctrl+Alt+M" },
            "thresholds": { "holdMs": 250, "doubleClickMs": 400 },
            "recording": { "maxSeconds": 60 },
            "insert": { "restoreClipboard": false, "postfix": "none" }
        }"#;
        let config: AgentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.azure.endpoint, "https://example.openai.azure.com");
        assert_eq!(config.azure.deployment, "whisper-large");
        assert_eq!(config.azure.api_version, "2024-06-01");
        assert_eq!(config.hotkey.windows, "Ctrl+Alt+M");
        assert_eq!(config.thresholds.hold_ms, 250);
        assert_eq!(config.thresholds.double_click_ms, 400);
        assert_eq!(config.recording.max_seconds, 60);
        assert!(!config.insert.restore_clipboard);
    }

    #[test]
    fn test_deserialize_partial_payload_uses_defaults() {
        let json = r#"{ "thresholds": { "holdMs": 200 } }"#;
        let config: AgentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.thresholds.hold_ms, 200);
        // Sibling field and untouched sections keep their defaults.
        assert_eq!(config.thresholds.double_click_ms, 300);
        assert_eq!(config.azure.api_version, "2025-03-01-preview");
        assert_eq!(config.recording.max_seconds, 120);
    }

    #[test]
    fn test_unrecognized_postfix_is_rejected() {
        let json = r#"{ "insert": { "postfix": "tab" } }"#;
        let result: Result<AgentConfig, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut config = AgentConfig::default();
        config.azure.endpoint = "https://unit.test".to_string();
        config.recording.max_seconds = 45;

        let json = serde_json::to_string(&config).unwrap();
        let back: AgentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_postfix_as_str() {
        assert_eq!(InsertPostfix::None.as_str(), "none");
    }
}
