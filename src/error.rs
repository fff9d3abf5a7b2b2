//! Error types for Backlog
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using BacklogError
pub type Result<T> = std::result::Result<T, BacklogError>;

/// Unified error type for Backlog operations
#[derive(Debug, Error)]
pub enum BacklogError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // List Backend Errors
    // -------------------------------------------------------------------------
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Journal corruption detected: {0}")]
    JournalCorruption(String),

    #[error("Journal write failed: {0}")]
    JournalWrite(String),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BacklogError {
    /// True when the error originated in the ordered-list layer
    /// (local journal, remote service, or the transport to it).
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            BacklogError::Io(_)
                | BacklogError::Backend(_)
                | BacklogError::JournalCorruption(_)
                | BacklogError::JournalWrite(_)
                | BacklogError::Network(_)
                | BacklogError::Protocol(_)
        )
    }
}

impl From<regex::Error> for BacklogError {
    fn from(err: regex::Error) -> Self {
        BacklogError::Config(format!("invalid pattern: {}", err))
    }
}
