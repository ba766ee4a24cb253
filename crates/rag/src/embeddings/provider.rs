//! Embedding provider trait and factory.

use crate::embeddings::config::{EmbeddingConfig, DEFAULT_BATCH_SIZE};
use crate::embeddings::providers::ollama::OllamaProvider;
use crate::embeddings::providers::trigram::{self, TrigramProvider};
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Maximum number of texts per `embed_batch` call.
    fn batch_size(&self) -> usize {
        DEFAULT_BATCH_SIZE
    }

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
///
/// HTTP-backed providers are probed once here, so an unreachable backend is
/// reported before any document is loaded.
pub async fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if config.dimensions == 0 {
        return Err(AppError::Config(
            "Embedding dimensions must be greater than 0".to_string(),
        ));
    }

    match config.provider.as_str() {
        "trigram" => {
            if config.model != trigram::MODEL {
                return Err(AppError::Config(format!(
                    "Embedding model '{}' is not available for the trigram provider (use '{}')",
                    config.model,
                    trigram::MODEL
                )));
            }
            let provider =
                TrigramProvider::new(config.dimensions).with_batch_size(config.batch_size);
            Ok(Arc::new(provider))
        }

        "ollama" => {
            let provider = OllamaProvider::new(config).await?;
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            config.provider
        ))),
    }
}
