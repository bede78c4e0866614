use thiserror::Error;

/// Top-level error type for the murmur console.
///
/// The agent's command surface reports failures as opaque display strings,
/// so most variants wrap a message rather than a structured cause. `From`
/// impls cover the conversions the `?` operator needs across crates.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MurmurError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for MurmurError {
    fn from(err: serde_json::Error) -> Self {
        MurmurError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for murmur operations.
pub type Result<T> = std::result::Result<T, MurmurError>;
