//! Embedding configuration.

use docqa_core::config::EmbeddingSettings;
use serde::{Deserialize, Serialize};

/// Default number of texts sent to a provider per call.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Settings for constructing an embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Maximum texts per embedding call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Base URL for HTTP providers
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            batch_size: DEFAULT_BATCH_SIZE,
            endpoint: None,
        }
    }
}

impl From<&EmbeddingSettings> for EmbeddingConfig {
    fn from(settings: &EmbeddingSettings) -> Self {
        Self {
            provider: settings.provider.clone(),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
            batch_size: DEFAULT_BATCH_SIZE,
            endpoint: settings.endpoint.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.provider, "trigram");
        assert_eq!(config.model, "trigram-v1");
        assert_eq!(config.dimensions, 384);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_from_settings() {
        let settings = EmbeddingSettings {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            endpoint: Some("http://gpu-box:11434".to_string()),
        };
        let config = EmbeddingConfig::from(&settings);
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.dimensions, 768);
        assert_eq!(config.endpoint.as_deref(), Some("http://gpu-box:11434"));
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let config: EmbeddingConfig = serde_json::from_str(
            r#"{"provider": "trigram", "model": "trigram-v1", "dimensions": 128}"#,
        )
        .unwrap();
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert!(config.endpoint.is_none());
    }
}
