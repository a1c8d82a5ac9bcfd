//! Configuration management for the Vigil security assistant.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Environment variables (VIGIL_*, GEMINI_API_KEY)
//! - Command-line flags
//! - An optional YAML config file

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default number of documents retrieved per query.
pub const DEFAULT_TOP_K: usize = 2;

/// Default delay between embedding calls during ingestion, in milliseconds.
/// Spaces out requests so startup does not trip provider rate limits.
pub const DEFAULT_INGEST_DELAY_MS: u64 = 1500;

/// Main application configuration.
///
/// This struct holds all global options that affect behavior across the
/// `ask` and `ingest` commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Model provider for generation and embeddings ("gemini", "mock")
    pub provider: String,

    /// Generation model identifier
    pub model: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// API key for the model provider
    pub api_key: Option<String>,

    /// Number of documents retrieved per query
    pub top_k: usize,

    /// Delay between embedding calls during ingestion, in milliseconds
    pub ingest_delay_ms: u64,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    provider: Option<ProviderSection>,
    retrieval: Option<RetrievalSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProviderSection {
    name: Option<String>,
    model: Option<String>,
    #[serde(rename = "embeddingModel")]
    embedding_model: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalSection {
    #[serde(rename = "topK")]
    top_k: Option<usize>,
    #[serde(rename = "ingestDelayMs")]
    ingest_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            embedding_model: "text-embedding-004".to_string(),
            api_key: None,
            top_k: DEFAULT_TOP_K,
            ingest_delay_ms: DEFAULT_INGEST_DELAY_MS,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `VIGIL_CONFIG`: Path to config file
    /// - `VIGIL_PROVIDER`: Model provider
    /// - `VIGIL_MODEL`: Generation model identifier
    /// - `VIGIL_EMBEDDING_MODEL`: Embedding model identifier
    /// - `VIGIL_API_KEY` / `GEMINI_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("VIGIL_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Load from YAML config file if one was given
        if let Some(path) = config.config_file.clone() {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "Config file does not exist: {:?}",
                    path
                )));
            }
            config = config.merge_yaml(&path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("VIGIL_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("VIGIL_MODEL") {
            config.model = model;
        }

        if let Ok(embedding_model) = std::env::var("VIGIL_EMBEDDING_MODEL") {
            config.embedding_model = embedding_model;
        }

        config.api_key = std::env::var("VIGIL_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(provider) = config_file.provider {
            if let Some(name) = provider.name {
                result.provider = name;
            }
            if let Some(model) = provider.model {
                result.model = model;
            }
            if let Some(embedding_model) = provider.embedding_model {
                result.embedding_model = embedding_model;
            }
            if let Some(env_var) = provider.api_key_env {
                if let Ok(key) = std::env::var(&env_var) {
                    result.api_key = Some(key);
                }
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(top_k) = retrieval.top_k {
                result.top_k = top_k;
            }
            if let Some(delay) = retrieval.ingest_delay_ms {
                result.ingest_delay_ms = delay;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["gemini", "mock"];

        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if self.provider == "gemini" && self.api_key.is_none() {
            return Err(AppError::Config(
                "Gemini provider requires an API key (set GEMINI_API_KEY or VIGIL_API_KEY)"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "gemini");
        assert_eq!(config.embedding_model, "text-embedding-004");
        assert_eq!(config.top_k, DEFAULT_TOP_K);
        assert_eq!(config.ingest_delay_ms, DEFAULT_INGEST_DELAY_MS);
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            Some("mock".to_string()),
            Some("gemini-2.0-pro".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "mock");
        assert_eq!(overridden.model, "gemini-2.0-pro");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_gemini_requires_key() {
        let mut config = AppConfig::default();
        config.provider = "gemini".to_string();
        config.api_key = None;
        assert!(config.validate().is_err());

        config.api_key = Some("test-key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_mock_provider() {
        let mut config = AppConfig::default();
        config.provider = "mock".to_string();
        assert!(config.validate().is_ok());
    }
}
