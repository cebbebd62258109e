//! Store error types

use thiserror::Error;

/// Errors that can occur against either persistence target
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl StoreError {
    /// Check if this error is worth retrying on a later turn
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Http { status, .. } => *status >= 500,
            StoreError::Network(_) => true,
            StoreError::Json(_) => false,
            StoreError::InvalidRecord(_) => false,
        }
    }
}
