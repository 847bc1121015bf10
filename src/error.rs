//! Crate-wide error type.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("quality must be between 0 and 5, got {0}")]
    InvalidQuality(u8),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("review item not found: {0}")]
    NotFound(String),

    #[error("invalid review item: {0}")]
    InvalidItem(String),

    #[error("timestamp out of range: {0}")]
    InvalidTimestamp(i64),

    #[error("corrupt stored state: {0}")]
    CorruptState(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
