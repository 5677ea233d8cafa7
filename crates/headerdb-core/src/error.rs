//! Error types for HeaderDB

use thiserror::Error;

/// HeaderDB core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed compilation database: {0}")]
    MalformedDatabase(String),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for HeaderDB
pub type Result<T> = std::result::Result<T, Error>;
