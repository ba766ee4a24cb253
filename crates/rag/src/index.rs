//! Building the searchable index for a corpus.

use crate::embeddings::{embed_all, normalize, EmbeddingProvider};
use crate::types::{Chunk, ScoredChunk};
use crate::vector_index::{FlatIndex, VectorIndex, VectorRecord};
use docqa_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Instant;

/// Embedded chunks plus the provider that embedded them.
///
/// Queries can only be embedded through [`Index::embed_query`], so a corpus
/// is always searched in the embedding space it was built in.
#[derive(Debug)]
pub struct Index {
    store: FlatIndex,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Index {
    /// Embed every chunk and build an exact index over the unit vectors.
    ///
    /// # Errors
    /// - `AppError::Input` if `chunks` is empty
    /// - `AppError::Embedding` if the provider fails or returns vectors of
    ///   the wrong dimension
    pub async fn build(chunks: Vec<Chunk>, embedder: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        if chunks.is_empty() {
            return Err(AppError::Input(
                "Cannot build an index from an empty chunk list".to_string(),
            ));
        }

        let start = Instant::now();
        tracing::info!(
            "Embedding {} chunks with '{}' (model: {})",
            chunks.len(),
            embedder.provider_name(),
            embedder.model_name()
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embed_all(embedder.as_ref(), &texts).await?;

        let records = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, mut embedding)| {
                normalize(&mut embedding);
                VectorRecord { chunk, embedding }
            })
            .collect();

        let store = FlatIndex::from_records(embedder.dimensions(), records)?;

        tracing::info!(
            "Built index of {} vectors ({} dims) in {:.2}s",
            store.len(),
            store.dimensions(),
            start.elapsed().as_secs_f64()
        );

        Ok(Self { store, embedder })
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.store.dimensions()
    }

    /// Model the index was built with.
    pub fn embedding_model(&self) -> &str {
        self.embedder.model_name()
    }

    /// Indexed chunks in chunk order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.store.records().iter().map(|r| &r.chunk)
    }

    /// Embed and normalize a query with this index's provider.
    pub(crate) async fn embed_query(&self, query: &str) -> AppResult<Vec<f32>> {
        let mut embedding = self.embedder.embed(query).await?;
        if embedding.len() != self.dimensions() {
            return Err(AppError::Embedding(format!(
                "Query embedding has {} dimensions, index expects {}",
                embedding.len(),
                self.dimensions()
            )));
        }
        normalize(&mut embedding);
        Ok(embedding)
    }

    pub(crate) fn search(&self, query: &[f32], top_k: usize) -> Vec<ScoredChunk> {
        self.store
            .search(query, top_k)
            .into_iter()
            .map(|(record, score)| ScoredChunk {
                chunk: record.chunk.clone(),
                score,
            })
            .collect()
    }
}
