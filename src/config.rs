//! Configuration for indexing limits and optional LLM navigation.
//!
//! Supports both environment variables and a YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{Error, Result};
use crate::indexer::DEFAULT_MAX_PAGES;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Limits applied when indexing a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Page cap applied during segmentation.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Longest accepted document text, in characters.
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

fn default_max_text_length() -> usize {
    1_000_000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_text_length: default_max_text_length(),
        }
    }
}

/// LLM navigation configuration.
///
/// Navigation is disabled by default; retrieval then runs purely lexically
/// and the `llm` query mode reports the capability as unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Whether LLM-guided navigation may be used at all.
    #[serde(default)]
    pub enabled: bool,

    /// Base URL for the LLM API (e.g., "https://api.openai.com")
    #[serde(default)]
    pub api_base: String,

    /// API key for authentication
    #[serde(default)]
    pub api_key: String,

    /// Model name (e.g., "gpt-4o-mini")
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens for response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.0
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: String::new(),
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl LlmConfig {
    /// Leading characters of the API key, for display without exposing it.
    pub fn api_key_preview(&self) -> String {
        self.api_key.chars().take(8).collect()
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Indexing limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// LLM settings
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (INDEX_MAX_PAGES, LLM_API_KEY, ...)
    /// 2. Config file (~/.config/vectorless/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Try to load from config file first
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        // Override with environment variables
        if let Ok(max_pages) = env::var("INDEX_MAX_PAGES") {
            if let Ok(value) = max_pages.parse() {
                config.limits.max_pages = value;
            }
        }

        if let Ok(max_text_length) = env::var("INDEX_MAX_TEXT_LENGTH") {
            if let Ok(value) = max_text_length.parse() {
                config.limits.max_text_length = value;
            }
        }

        if let Ok(enabled) = env::var("LLM_NAVIGATION") {
            config.llm.enabled = matches!(enabled.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Ok(api_base) = env::var("LLM_API_BASE") {
            config.llm.api_base = api_base;
        }

        if let Ok(api_key) = env::var("LLM_API_KEY") {
            config.llm.api_key = api_key;
        }

        if let Ok(model) = env::var("LLM_MODEL") {
            config.llm.model = model;
        }

        if let Ok(max_tokens) = env::var("LLM_MAX_TOKENS") {
            if let Ok(value) = max_tokens.parse() {
                config.llm.max_tokens = value;
            }
        }

        if let Ok(temperature) = env::var("LLM_TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                config.llm.temperature = value;
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// Missing fields fall back to their defaults, so a partial file is
    /// always accepted.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "vectorless")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that the configuration is usable.
    ///
    /// LLM credentials are only required when navigation is enabled.
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_pages == 0 {
            return Err(Error::Config(
                "max_pages must be positive. Set INDEX_MAX_PAGES or fix the config file."
                    .to_string(),
            ));
        }

        if self.limits.max_text_length == 0 {
            return Err(Error::Config(
                "max_text_length must be positive. Set INDEX_MAX_TEXT_LENGTH or fix the config file."
                    .to_string(),
            ));
        }

        if self.llm.enabled {
            if self.llm.api_base.is_empty() {
                return Err(Error::Config(
                    "LLM API base URL is required when navigation is enabled. Set LLM_API_BASE or add to config file.".to_string()
                ));
            }

            if self.llm.api_key.is_empty() {
                return Err(Error::Config(
                    "LLM API key is required when navigation is enabled. Set LLM_API_KEY or add to config file.".to_string()
                ));
            }

            if self.llm.model.is_empty() {
                return Err(Error::Config(
                    "LLM model is required when navigation is enabled. Set LLM_MODEL or add to config file.".to_string()
                ));
            }
        }

        Ok(())
    }

    /// Create a config with navigation enabled (useful for testing).
    pub fn with_llm(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            limits: LimitsConfig::default(),
            llm: LlmConfig {
                enabled: true,
                api_base: api_base.into(),
                api_key: api_key.into(),
                model: model.into(),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.limits.max_pages, 300);
        assert_eq!(config.limits.max_text_length, 1_000_000);
        assert!(!config.llm.enabled);
        assert!(config.llm.api_base.is_empty());
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.llm.temperature, 0.0);
    }

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_credentials_when_enabled() {
        let mut config = Config::default();
        config.llm.enabled = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = Config::default();
        config.limits.max_pages = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.limits.max_text_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_llm() {
        let config = Config::with_llm("https://api.example.com", "test-key", "gpt-4");
        assert!(config.llm.enabled);
        assert_eq!(config.llm.api_base, "https://api.example.com");
        assert_eq!(config.llm.api_key, "test-key");
        assert_eq!(config.llm.model, "gpt-4");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_key_preview_counts_chars() {
        let mut config = Config::default();
        config.llm.api_key = "sk-proj-secret".to_string();
        assert_eq!(config.llm.api_key_preview(), "sk-proj-");

        // 8 chars but 9 bytes; the preview must cut on a char boundary.
        config.llm.api_key = "abcdefgé".to_string();
        assert_eq!(config.llm.api_key_preview(), "abcdefgé");

        config.llm.api_key = "ab".to_string();
        assert_eq!(config.llm.api_key_preview(), "ab");
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "limits:\n  max_pages: 50\nllm:\n  enabled: true\n  model: custom\n",
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();

        assert_eq!(config.limits.max_pages, 50);
        assert_eq!(config.limits.max_text_length, 1_000_000);
        assert!(config.llm.enabled);
        assert_eq!(config.llm.model, "custom");
        assert!(config.llm.api_base.is_empty());
    }
}
