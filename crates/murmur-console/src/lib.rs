//! Murmur Console crate - client-side controller for the dictation agent.
//!
//! Holds the state a control surface renders (configuration draft, session
//! status, key and autostart tri-states, error and transcript slots, busy
//! flags) and coordinates the gateway commands and pushed events that
//! mutate it. The agent owns all real state; this crate only mirrors it
//! and survives the agent being slow, partial, or away.

pub mod console;
pub mod draft;
pub mod state;
pub mod view;

pub use console::Console;
pub use draft::{DraftStore, FIELDS};
pub use state::{ConsoleState, MessageSlot};
pub use view::{StatusView, ACTION_START, ACTION_STOP};
