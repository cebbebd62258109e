//! External text-generation capability boundary
//!
//! The engine treats the capability as opaque and unreliable: given a
//! structured prompt it returns text that may be malformed JSON,
//! Markdown-wrapped JSON, a partial document, or an outright failure.
//! Everything downstream of this trait parses defensively.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

mod error;
mod gemini;

pub use error::ModelError;
pub use gemini::GeminiClient;

use crate::config::LlmConfig;

/// Tuning knobs for one invocation
#[derive(Debug, Clone)]
pub struct InvokeOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 8192,
        }
    }
}

/// The opaque generation capability
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Send one prompt, get raw text back
    ///
    /// Output must never be assumed well-formed.
    async fn invoke(&self, prompt: &str, options: &InvokeOptions) -> Result<String, ModelError>;
}

/// Create a model client based on the provider specified in config
pub fn create_model(config: &LlmConfig) -> Result<Arc<dyn TextModel>, ModelError> {
    debug!(provider = %config.provider, model = %config.model, "create_model: called");
    match config.provider.as_str() {
        "gemini" => {
            debug!("create_model: creating Gemini client");
            Ok(Arc::new(GeminiClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_model: unknown provider");
            Err(ModelError::InvalidResponse(format!(
                "Unknown model provider: '{}'. Supported: gemini",
                other
            )))
        }
    }
}
