//! Shared state cells backing the console.
//!
//! `ConsoleState` gathers everything the console tracks between operations:
//! the configuration draft, the session status view, the API-key and
//! autostart tri-states, the single error and transcript slots, the busy
//! flags, and the per-category sequence counters that let a completion
//! detect it has been superseded by a newer request.
//!
//! All cells are independently synchronized. Writers never hold more than
//! one lock at a time, and readers may observe one cell updated before
//! another; the console deliberately has no cross-cell transactions.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use murmur_core::status::{AutostartState, KeyPresence};

use crate::draft::DraftStore;
use crate::view::StatusView;

/// A single-message cell that later writers overwrite.
///
/// Used for both the error slot and the transcript slot: the console keeps
/// at most one of each, and whichever write lands last wins.
#[derive(Debug, Default)]
pub struct MessageSlot {
    message: Mutex<Option<String>>,
}

impl MessageSlot {
    /// Returns the current message, if any.
    pub fn get(&self) -> Option<String> {
        self.message.lock().expect("slot mutex poisoned").clone()
    }

    pub(crate) fn set(&self, message: impl Into<String>) {
        let mut guard = self.message.lock().expect("slot mutex poisoned");
        *guard = Some(message.into());
    }

    pub(crate) fn clear(&self) {
        let mut guard = self.message.lock().expect("slot mutex poisoned");
        *guard = None;
    }
}

/// Everything the console knows about the agent, in one place.
#[derive(Debug)]
pub struct ConsoleState {
    draft: DraftStore,
    view: StatusView,
    key: Mutex<KeyPresence>,
    autostart: Mutex<AutostartState>,
    error: MessageSlot,
    transcript: MessageSlot,
    loading: AtomicBool,
    saving: AtomicBool,
    reload_seq: AtomicU64,
    test_seq: AtomicU64,
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleState {
    /// Create the initial state.
    ///
    /// `loading` starts `true`: until the first reload settles, nothing the
    /// console shows has been confirmed against the agent, and saving is
    /// held off accordingly.
    pub fn new() -> Self {
        Self {
            draft: DraftStore::new(),
            view: StatusView::new(),
            key: Mutex::new(KeyPresence::Unknown),
            autostart: Mutex::new(AutostartState::Unknown),
            error: MessageSlot::default(),
            transcript: MessageSlot::default(),
            loading: AtomicBool::new(true),
            saving: AtomicBool::new(false),
            reload_seq: AtomicU64::new(0),
            test_seq: AtomicU64::new(0),
        }
    }

    /// The editable configuration draft.
    pub fn draft(&self) -> &DraftStore {
        &self.draft
    }

    /// The latest reported session status.
    pub fn view(&self) -> &StatusView {
        &self.view
    }

    /// Whether the agent holds a usable API key.
    pub fn key_presence(&self) -> KeyPresence {
        *self.key.lock().expect("key mutex poisoned")
    }

    pub(crate) fn set_key_presence(&self, presence: KeyPresence) {
        *self.key.lock().expect("key mutex poisoned") = presence;
    }

    /// Whether the agent starts with the user session.
    pub fn autostart(&self) -> AutostartState {
        *self.autostart.lock().expect("autostart mutex poisoned")
    }

    pub(crate) fn set_autostart_state(&self, state: AutostartState) {
        *self.autostart.lock().expect("autostart mutex poisoned") = state;
    }

    /// The surfaced error, if any. Issuing most operations clears it.
    pub fn last_error(&self) -> Option<String> {
        self.error.get()
    }

    /// The most recent transcription test result, if any.
    pub fn transcript(&self) -> Option<String> {
        self.transcript.get()
    }

    pub(crate) fn set_error(&self, message: impl Into<String>) {
        self.error.set(message);
    }

    pub(crate) fn clear_error(&self) {
        self.error.clear();
    }

    pub(crate) fn set_transcript(&self, text: impl Into<String>) {
        self.transcript.set(text);
    }

    pub(crate) fn clear_transcript(&self) {
        self.transcript.clear();
    }

    /// Whether a reload is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Whether a save is in flight.
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    /// Whether the save control should be enabled.
    ///
    /// Advisory only: this gates nothing structurally, and an operation
    /// issued while it reads `false` still runs.
    pub fn can_save(&self) -> bool {
        !self.is_loading() && !self.is_saving()
    }

    pub(crate) fn set_loading(&self, value: bool) {
        self.loading.store(value, Ordering::SeqCst);
    }

    pub(crate) fn set_saving(&self, value: bool) {
        self.saving.store(value, Ordering::SeqCst);
    }

    /// Claim the next reload token, marking earlier reloads superseded.
    pub(crate) fn next_reload_token(&self) -> u64 {
        self.reload_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `token` still names the newest reload.
    pub(crate) fn reload_is_current(&self, token: u64) -> bool {
        self.reload_seq.load(Ordering::SeqCst) == token
    }

    /// Claim the next transcription-test token.
    pub(crate) fn next_test_token(&self) -> u64 {
        self.test_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `token` still names the newest transcription test.
    pub(crate) fn test_is_current(&self, token: u64) -> bool {
        self.test_seq.load(Ordering::SeqCst) == token
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = ConsoleState::new();
        assert!(state.is_loading());
        assert!(!state.is_saving());
        assert!(!state.can_save());
        assert_eq!(state.key_presence(), KeyPresence::Unknown);
        assert_eq!(state.autostart(), AutostartState::Unknown);
        assert!(state.last_error().is_none());
        assert!(state.transcript().is_none());
    }

    #[test]
    fn test_can_save_requires_both_flags_clear() {
        let state = ConsoleState::new();

        state.set_loading(false);
        assert!(state.can_save());

        state.set_saving(true);
        assert!(!state.can_save());

        state.set_loading(true);
        assert!(!state.can_save());

        state.set_saving(false);
        assert!(!state.can_save());

        state.set_loading(false);
        assert!(state.can_save());
    }

    #[test]
    fn test_slot_overwrite_and_clear() {
        let state = ConsoleState::new();

        state.set_error("first");
        state.set_error("second");
        assert_eq!(state.last_error().as_deref(), Some("second"));

        state.clear_error();
        assert!(state.last_error().is_none());

        state.set_transcript("hello world");
        assert_eq!(state.transcript().as_deref(), Some("hello world"));
        state.clear_transcript();
        assert!(state.transcript().is_none());
    }

    #[test]
    fn test_tri_state_setters() {
        let state = ConsoleState::new();

        state.set_key_presence(KeyPresence::Present);
        assert_eq!(state.key_presence(), KeyPresence::Present);

        state.set_autostart_state(AutostartState::Disabled);
        assert_eq!(state.autostart(), AutostartState::Disabled);
    }

    #[test]
    fn test_newer_token_supersedes_older() {
        let state = ConsoleState::new();

        let first = state.next_reload_token();
        assert!(state.reload_is_current(first));

        let second = state.next_reload_token();
        assert!(!state.reload_is_current(first));
        assert!(state.reload_is_current(second));
    }

    #[test]
    fn test_reload_and_test_tokens_are_independent() {
        let state = ConsoleState::new();

        let reload = state.next_reload_token();
        let test = state.next_test_token();

        // Claiming another test token leaves the reload token current.
        state.next_test_token();
        assert!(state.reload_is_current(reload));
        assert!(!state.test_is_current(test));
    }
}
