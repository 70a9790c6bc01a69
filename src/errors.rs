use thiserror::Error;

/// Errors raised while loading a market snapshot from disk.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid snapshot: {0}")]
    Invalid(String),
}
