pub mod config;
pub mod error;
pub mod events;
pub mod status;

pub use config::AgentConfig;
pub use error::{MurmurError, Result};
pub use events::AgentEvent;
pub use status::{AutostartState, KeyPresence, KeyProbe, SessionState, SessionStatus};
