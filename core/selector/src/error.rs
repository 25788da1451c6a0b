//! FILENAME: core/selector/src/error.rs
//! PURPOSE: Errors for selector construction.
//! CONTEXT: Runtime event handling never fails; malformed input degrades to an
//! empty or unchanged state and is only logged. Only setting a selector up
//! (options, log file) can return an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectorError {
    #[error("Invalid selector options: {0}")]
    InvalidOptions(String),

    #[error("Options JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SelectorResult<T> = Result<T, SelectorError>;
