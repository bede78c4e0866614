//! Console-side settings.
//!
//! The agent owns everything about dictation; the only durable choice the
//! console keeps for itself is how to reach the agent. Stored as TOML at
//! `~/.murmur/config.toml`, overridable with the `MURMUR_CONFIG` env var.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use murmur_core::error::{MurmurError, Result};

/// Settings for the console binary itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    pub agent: AgentSettings,
}

/// How to reach the agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Base URL of the agent's command gateway.
    pub url: Option<String>,
}

impl ConsoleSettings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings =
            toml::from_str(&content).map_err(|e| MurmurError::Config(e.to_string()))?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is absent or
    /// does not parse. A missing file is the normal first-run case and is
    /// not reported; a file that fails to parse is.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    "Failed to load settings from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

/// Resolve the settings file path (MURMUR_CONFIG env, or ~/.murmur/config.toml).
pub fn settings_path() -> PathBuf {
    if let Ok(p) = std::env::var("MURMUR_CONFIG") {
        return PathBuf::from(p);
    }
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".murmur").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".murmur").join("config.toml");
    }
    PathBuf::from("config.toml")
}

// =============================================================================
// Tests
// =============================================================================
