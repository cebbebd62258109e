//! Wayfinder configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main Wayfinder configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation capability configuration
    pub llm: LlmConfig,

    /// Durable store configuration
    pub store: StoreConfig,

    /// Slot defaults used by the shortcut paths
    pub defaults: DefaultsConfig,

    /// Log level (overridden by --log-level on the CLI)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .wayfinder.yml
        let local_config = PathBuf::from(".wayfinder.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/wayfinder/wayfinder.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("wayfinder").join("wayfinder.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Generation capability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "gemini" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum output tokens per response
    #[serde(rename = "max-output-tokens")]
    pub max_output_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).map_err(|_| {
            eyre::eyre!(
                "Model API key not found. Set the {} environment variable.",
                self.api_key_env
            )
        })
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.7,
            max_output_tokens: 8192,
            timeout_ms: 120_000,
        }
    }
}

/// Durable store configuration
///
/// When `rest-url` is unset the engine runs cache-only: remote writes are
/// skipped and everything lives for the session only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the PostgREST-style endpoint, e.g. https://x.example.co/rest/v1
    #[serde(rename = "rest-url")]
    pub rest_url: Option<String>,

    /// Environment variable containing the store API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl StoreConfig {
    /// Read the store API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).map_err(|_| {
            eyre::eyre!(
                "Store API key not found. Set the {} environment variable.",
                self.api_key_env
            )
        })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            rest_url: None,
            api_key_env: "PLANSTORE_API_KEY".to_string(),
            timeout_ms: 15_000,
        }
    }
}

/// Defaults the shortcut paths fill into unset slots
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub budget: String,
    pub travelers: String,
    pub interest: String,

    /// Trip length for the "surprise me" path
    #[serde(rename = "surprise-days")]
    pub surprise_days: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            budget: "Mid-range".to_string(),
            travelers: "1".to_string(),
            interest: "Mixed".to_string(),
            surprise_days: 5,
        }
    }
}
