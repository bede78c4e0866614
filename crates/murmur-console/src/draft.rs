//! Editable configuration draft with snapshot publication.
//!
//! The draft store holds the configuration a user is editing before it is
//! persisted to the agent. Reads hand out an immutable snapshot behind an
//! `Arc`; every edit clones the current snapshot, applies the change to the
//! clone, and publishes the clone as the new snapshot. A snapshot obtained
//! before an edit is therefore never affected by it, and a rejected edit
//! publishes nothing at all.

use std::sync::{Arc, Mutex};

use murmur_core::config::InsertPostfix;
use murmur_core::error::{MurmurError, Result};
use murmur_core::AgentConfig;

/// Every editable field path, in wire-name form.
///
/// Paths use the camelCase names the agent speaks so that a field named in
/// an error message or a CLI invocation matches what appears on the wire.
pub const FIELDS: [&str; 9] = [
    "azure.endpoint",
    "azure.deployment",
    "azure.apiVersion",
    "hotkey.windows",
    "thresholds.holdMs",
    "thresholds.doubleClickMs",
    "recording.maxSeconds",
    "insert.restoreClipboard",
    "insert.postfix",
];

/// Thread-safe store for the in-progress configuration draft.
#[derive(Debug)]
pub struct DraftStore {
    snapshot: Mutex<Arc<AgentConfig>>,
}

impl Default for DraftStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftStore {
    /// Create a draft store holding the default configuration.
    pub fn new() -> Self {
        Self {
            snapshot: Mutex::new(Arc::new(AgentConfig::default())),
        }
    }

    /// Returns the current draft snapshot.
    ///
    /// The snapshot is immutable; later edits publish a fresh one and leave
    /// this value untouched.
    pub fn get(&self) -> Arc<AgentConfig> {
        Arc::clone(&self.snapshot.lock().expect("draft mutex poisoned"))
    }

    /// Apply a single textual edit to the named field.
    ///
    /// `raw` is converted to the field's native type at this boundary:
    /// numeric fields parse as `u64`, `insert.restoreClipboard` accepts
    /// `true`/`false`, and `insert.postfix` accepts its known variants.
    /// A value that fails to convert is rejected with
    /// [`MurmurError::Config`] and the stored draft does not change.
    /// No range clamping is applied; validating values is the agent's job.
    pub fn set(&self, path: &str, raw: &str) -> Result<()> {
        let mut guard = self.snapshot.lock().expect("draft mutex poisoned");
        let mut draft = AgentConfig::clone(&guard);
        set_field(&mut draft, path, raw)?;
        tracing::debug!(path, "draft field updated");
        *guard = Arc::new(draft);
        Ok(())
    }

    /// Replace the entire draft, discarding any pending edits.
    pub fn replace(&self, config: AgentConfig) {
        let mut guard = self.snapshot.lock().expect("draft mutex poisoned");
        *guard = Arc::new(config);
    }
}

fn set_field(config: &mut AgentConfig, path: &str, raw: &str) -> Result<()> {
    match path {
        "azure.endpoint" => config.azure.endpoint = raw.to_string(),
        "azure.deployment" => config.azure.deployment = raw.to_string(),
        "azure.apiVersion" => config.azure.api_version = raw.to_string(),
        "hotkey.windows" => config.hotkey.windows = raw.to_string(),
        "thresholds.holdMs" => config.thresholds.hold_ms = parse_number(path, raw)?,
        "thresholds.doubleClickMs" => config.thresholds.double_click_ms = parse_number(path, raw)?,
        "recording.maxSeconds" => config.recording.max_seconds = parse_number(path, raw)?,
        "insert.restoreClipboard" => config.insert.restore_clipboard = parse_bool(path, raw)?,
        "insert.postfix" => config.insert.postfix = parse_postfix(path, raw)?,
        _ => {
            return Err(MurmurError::Config(format!(
                "unknown configuration field: {path}"
            )))
        }
    }
    Ok(())
}

fn parse_number(path: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| MurmurError::Config(format!("invalid number for {path}: {raw:?}")))
}

fn parse_bool(path: &str, raw: &str) -> Result<bool> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(MurmurError::Config(format!(
            "invalid boolean for {path}: {raw:?} (expected true or false)"
        ))),
    }
}

fn parse_postfix(path: &str, raw: &str) -> Result<InsertPostfix> {
    match raw.trim() {
        "none" => Ok(InsertPostfix::None),
        _ => Err(MurmurError::Config(format!(
            "unrecognized value for {path}: {raw:?}"
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================
