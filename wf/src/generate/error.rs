//! Generation error taxonomy

use thiserror::Error;

use crate::llm::ModelError;

/// Everything that can go wrong turning slots into an itinerary
///
/// All variants are recovered at the engine boundary into a user-visible
/// chat message; none of them crash the conversation.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Response text is not parseable JSON
    #[error("Response was not valid JSON: {0}")]
    InvalidFormat(String),

    /// Parseable JSON, but missing required keys or wrong shapes
    #[error("Response JSON missing required structure: {0}")]
    InvalidSchema(String),

    /// The capability call timed out
    #[error("Generation timed out")]
    Timeout,

    /// Network or API failure reaching the capability
    #[error("Network error: {0}")]
    Network(String),

    /// A required slot was missing at generation time
    ///
    /// The state machine invariant makes this unreachable, but it is checked
    /// defensively rather than assumed.
    #[error("Missing required trip parameter: {0}")]
    Validation(String),
}

impl GenerationError {
    /// The apology shown in chat when this error reaches the user
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::InvalidFormat(_) | GenerationError::InvalidSchema(_) => {
                "Sorry, I couldn't put that itinerary together properly. Could you rephrase or try again?".to_string()
            }
            GenerationError::Timeout => {
                "Sorry, that took too long to generate. Please try again.".to_string()
            }
            GenerationError::Network(_) => {
                "Sorry, I couldn't reach the planning service. Please try again in a moment.".to_string()
            }
            GenerationError::Validation(slot) => {
                format!("I'm missing your {} before I can plan this trip.", slot)
            }
        }
    }
}

impl From<ModelError> for GenerationError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Timeout(_) => GenerationError::Timeout,
            ModelError::Network(e) => GenerationError::Network(e.to_string()),
            ModelError::ApiError { status, message } => {
                GenerationError::Network(format!("API error {}: {}", status, message))
            }
            ModelError::InvalidResponse(msg) => GenerationError::InvalidFormat(msg),
            ModelError::Json(e) => GenerationError::InvalidFormat(e.to_string()),
        }
    }
}
