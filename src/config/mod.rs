//! Configuration management for Souk
//!
//! Handles loading, validation, and environment overrides for all search
//! tuning knobs. Oversampling multipliers and fusion weights are deliberately
//! configuration, not constants: they are tuning parameters with no single
//! correct value.

use crate::error::{Result, SoukError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub intent: IntentConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub reranking: RerankingConfig,
}

/// Retrieval and ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum accepted query length in characters
    pub max_query_len: usize,
    /// Page size used when a request does not specify one
    pub default_page_size: usize,
    /// Upper bound on requested page size
    pub max_page_size: usize,
    /// Weight of the lexical score in hybrid fusion
    pub text_weight: f32,
    /// Weight of the vector score in hybrid fusion
    pub vector_weight: f32,
    /// Multiplicative boost applied to candidates matching a soft color
    /// preference
    pub color_boost: f32,
    /// Auxiliary relevance score above which the color boost applies
    pub color_boost_threshold: f32,
    /// Vector candidate budget as a multiple of `page * page_size`
    pub vector_oversample_multiplier: usize,
    /// Minimum vector candidate budget regardless of page
    pub vector_oversample_floor: usize,
    /// Per-leg sample size in hybrid mode as a multiple of `page * page_size`
    pub hybrid_sample_multiplier: usize,
    /// Minimum per-leg sample size in hybrid mode
    pub hybrid_sample_floor: usize,
    /// Bound on each document store call, in milliseconds
    pub store_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_query_len: 200,
            default_page_size: 20,
            max_page_size: 100,
            text_weight: 0.4,
            vector_weight: 0.6,
            color_boost: 1.2,
            color_boost_threshold: 0.5,
            vector_oversample_multiplier: 3,
            vector_oversample_floor: 100,
            hybrid_sample_multiplier: 3,
            hybrid_sample_floor: 100,
            store_timeout_ms: 5000,
        }
    }
}

/// Intent extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentConfig {
    /// Whether the LLM extractor is consulted before the heuristic parser
    pub llm_enabled: bool,
    /// Minimum LLM confidence below which its output is discarded
    pub confidence_threshold: f32,
    /// Bound on the LLM intent call, in milliseconds
    pub llm_timeout_ms: u64,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            llm_enabled: false,
            confidence_threshold: 0.7,
            llm_timeout_ms: 2000,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Expected embedding dimension; deployment-fixed
    pub dimension: usize,
    /// Bound on each embedding call, in milliseconds
    pub timeout_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: 384,
            timeout_ms: 3000,
        }
    }
}

/// Reranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankingConfig {
    /// Bound on each rerank call, in milliseconds
    pub timeout_ms: u64,
    /// Maximum number of candidates handed to the reranker
    pub max_candidates: usize,
    /// Description truncation length in candidate summaries
    pub summary_description_len: usize,
}

impl Default for RerankingConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 3000,
            max_candidates: 100,
            summary_description_len: 200,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SoukError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SoukError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| SoukError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: SOUK_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("SOUK_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "INTENT__LLM_ENABLED" => {
                self.intent.llm_enabled = value.parse().map_err(|_| {
                    SoukError::Config(format!("Cannot parse '{}' as boolean", value))
                })?;
            }
            "INTENT__CONFIDENCE_THRESHOLD" => {
                self.intent.confidence_threshold = value.parse().map_err(|_| {
                    SoukError::Config(format!("Cannot parse '{}' as float", value))
                })?;
            }
            "SEARCH__TEXT_WEIGHT" => {
                self.search.text_weight = value.parse().map_err(|_| {
                    SoukError::Config(format!("Cannot parse '{}' as float", value))
                })?;
            }
            "SEARCH__VECTOR_WEIGHT" => {
                self.search.vector_weight = value.parse().map_err(|_| {
                    SoukError::Config(format!("Cannot parse '{}' as float", value))
                })?;
            }
            "EMBEDDING__DIMENSION" => {
                self.embedding.dimension = value.parse().map_err(|_| {
                    SoukError::Config(format!("Cannot parse '{}' as integer", value))
                })?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SoukError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("souk").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_pass_validation() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let mut config = Config::default();
        config.search.text_weight = 0.5;
        config.search.vector_weight = 0.5;
        config.intent.llm_enabled = true;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.search.text_weight, 0.5);
        assert_eq!(loaded.search.vector_weight, 0.5);
        assert!(loaded.intent.llm_enabled);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[search]\nmax_page_size = 50\ndefault_page_size = 10\nmax_query_len = 200\ntext_weight = 0.4\nvector_weight = 0.6\ncolor_boost = 1.2\ncolor_boost_threshold = 0.5\nvector_oversample_multiplier = 3\nvector_oversample_floor = 100\nhybrid_sample_multiplier = 3\nhybrid_sample_floor = 100\nstore_timeout_ms = 5000\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.search.max_page_size, 50);
        // Missing sections come from defaults
        assert_eq!(loaded.embedding.dimension, 384);
        assert!(!loaded.intent.llm_enabled);
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope.toml");
        assert!(matches!(
            Config::load(&path),
            Err(SoukError::ConfigNotFound { .. })
        ));
    }
}
