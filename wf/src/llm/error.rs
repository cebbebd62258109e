//! Model capability error types

use std::time::Duration;
use thiserror::Error;

/// Errors from the external text-generation capability
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    /// Check if this error could succeed on a later attempt
    pub fn is_transient(&self) -> bool {
        match self {
            ModelError::ApiError { status, .. } => *status == 429 || *status >= 500,
            ModelError::Network(_) => true,
            ModelError::Timeout(_) => true,
            ModelError::InvalidResponse(_) => false,
            ModelError::Json(_) => false,
        }
    }
}
