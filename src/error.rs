//! Error types for pagewise operations.

use thiserror::Error;

/// Errors that can occur while opening or persisting a document.
///
/// Encoding ambiguity is deliberately absent: detection always yields a guess.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "cli")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
