//! Embedding backends.
//!
//! An embedding provider maps text to a fixed-length vector. The index keeps
//! a handle to the provider it was built with, so queries are always embedded
//! in the same space as the chunks.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

use docqa_core::{AppError, AppResult};

/// Embed `texts` in provider-sized batches, checking every vector's dimension.
pub async fn embed_all(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
) -> AppResult<Vec<Vec<f32>>> {
    let batch_size = provider.batch_size().max(1);
    let mut embeddings = Vec::with_capacity(texts.len());

    for (i, batch) in texts.chunks(batch_size).enumerate() {
        tracing::debug!("Embedding batch {} ({} texts)", i + 1, batch.len());
        let vectors = provider.embed_batch(batch).await?;
        if vectors.len() != batch.len() {
            return Err(AppError::Embedding(format!(
                "Provider '{}' returned {} embeddings for {} texts",
                provider.provider_name(),
                vectors.len(),
                batch.len()
            )));
        }
        embeddings.extend(vectors);
    }

    for vector in &embeddings {
        if vector.len() != provider.dimensions() {
            return Err(AppError::Embedding(format!(
                "Embedding has {} dimensions, expected {}",
                vector.len(),
                provider.dimensions()
            )));
        }
    }

    Ok(embeddings)
}

/// Scale a vector to unit length in place. Zero vectors stay zero.
pub fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::trigram::TrigramProvider;

    #[test]
    fn test_normalize() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0; 4];
        normalize(&mut zero);
        assert!(zero.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_embed_all_batches_preserve_order() {
        let provider = TrigramProvider::new(64).with_batch_size(2);
        let texts: Vec<String> = ["alpha", "bravo", "charlie", "delta", "echo"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let batched = embed_all(&provider, &texts).await.unwrap();
        assert_eq!(batched.len(), 5);
        for (text, vector) in texts.iter().zip(&batched) {
            assert_eq!(vector, &provider.embed(text).await.unwrap());
        }
    }
}
