//! Error types for Lumen crates

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LumenError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LumenError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
