//! Gemini generateContent API client
//!
//! Implements the TextModel trait over Google's REST endpoint. Single
//! attempt per invocation: generation is expensive, so retry policy is
//! user-visible (the dialog surfaces the failure and accepts another turn)
//! rather than a silent backoff loop in here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{InvokeOptions, ModelError, TextModel};
use crate::config::LlmConfig;

/// Gemini REST API client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, ModelError> {
        debug!(model = %config.model, "from_config: called");
        let api_key = config
            .get_api_key()
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let timeout = Duration::from_millis(config.timeout_ms);

        let http = Client::builder().timeout(timeout).build().map_err(ModelError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            timeout,
        })
    }

    /// Build the generateContent request body
    fn build_request_body(&self, prompt: &str, options: &InvokeOptions) -> serde_json::Value {
        debug!(prompt_len = prompt.len(), "build_request_body: called");
        serde_json::json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "temperature": options.temperature,
                "maxOutputTokens": options.max_output_tokens,
            }
        })
    }

    /// Pull the concatenated text out of the first candidate
    fn extract_text(&self, response: GeminiResponse) -> Result<String, ModelError> {
        debug!(candidates = response.candidates.len(), "extract_text: called");
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("response contained no candidates".to_string()))?;

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            debug!("extract_text: candidate had no text parts");
            return Err(ModelError::InvalidResponse("candidate contained no text".to_string()));
        }

        Ok(text)
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn invoke(&self, prompt: &str, options: &InvokeOptions) -> Result<String, ModelError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "invoke: called");
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = self.build_request_body(prompt, options);

        let response = self.http.post(url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                debug!("invoke: request timed out");
                ModelError::Timeout(self.timeout)
            } else {
                debug!(error = %e, "invoke: network error");
                ModelError::Network(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "invoke: API error");
            return Err(ModelError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        debug!("invoke: success");
        let api_response: GeminiResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout(self.timeout)
            } else {
                ModelError::Network(e)
            }
        })?;
        self.extract_text(api_response)
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GeminiClient {
        GeminiClient {
            model: "gemini-2.0-flash".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            http: Client::new(),
            timeout: Duration::from_secs(120),
        }
    }

    #[test]
    fn test_build_request_body() {
        let client = test_client();
        let options = InvokeOptions {
            temperature: 0.7,
            max_output_tokens: 4096,
        };

        let body = client.build_request_body("plan a trip", &options);

        assert_eq!(body["contents"][0]["parts"][0]["text"], "plan a trip");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4096);
    }

    #[test]
    fn test_extract_text_concatenates_parts() {
        let client = test_client();
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{"text": "{\"a\":"}, {"text": "1}"}] }
            }]
        }))
        .unwrap();

        assert_eq!(client.extract_text(response).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_extract_text_empty_candidates() {
        let client = test_client();
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({"candidates": []})).unwrap();
        assert!(matches!(
            client.extract_text(response),
            Err(ModelError::InvalidResponse(_))
        ));
    }
}
