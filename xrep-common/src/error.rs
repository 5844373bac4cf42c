//! Common error types for the report engine

use thiserror::Error;

/// Common result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the result-aggregation engine and its helpers
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid argument combination supplied by the caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialized record could not be decoded (unknown severity or
    /// message type names end up here)
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML configuration file
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
