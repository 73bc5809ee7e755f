//! Error types for LedgerChain

use thiserror::Error;

use crate::blockchain::BrokenLink;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    #[error("Block not found: {0}")]
    NotFound(String),
    #[error("Chain integrity compromised: {0}")]
    IntegrityError(BrokenLink),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::SerializationError(err.to_string())
    }
}

impl From<tempfile::PersistError> for ChainError {
    fn from(err: tempfile::PersistError) -> Self {
        ChainError::IoError(err.error.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
