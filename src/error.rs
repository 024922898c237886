//! Error types for the playback controller

use thiserror::Error;

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned to the host application.
///
/// Playback faults that happen after a source was accepted are never returned
/// through this type; they show up as `failed` or `stalled` on the status
/// stream.
#[derive(Error, Debug)]
pub enum Error {
    /// The locator is malformed or points at something unreachable
    #[error("Invalid source locator: {0}")]
    SourceInvalid(String),

    /// The engine refused or failed to load the source
    #[error("Engine failure: {0}")]
    EngineFailure(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The controller loop has shut down
    #[error("Player loop is no longer running")]
    Closed,

    /// A reply was dropped before it was sent
    #[error("Request canceled: {0}")]
    Canceled(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}
