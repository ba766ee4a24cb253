//! In-memory vector storage and exact nearest-neighbor search.

use crate::types::Chunk;
use docqa_core::{AppError, AppResult};
use std::cmp::Ordering;

/// A chunk and its unit-length embedding.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// Trait for vector index backends.
///
/// Implementations are built once from a full record set and are read-only
/// afterwards; search must be safe to call from many tasks at once.
pub trait VectorIndex: Send + Sync {
    /// Search for the `top_k` records most similar to `query`.
    ///
    /// Returns records ordered by descending inner product, ties broken by
    /// lower chunk index.
    fn search(&self, query: &[f32], top_k: usize) -> Vec<(&VectorRecord, f32)>;

    /// All records in insertion order.
    fn records(&self) -> &[VectorRecord];

    /// Vector dimension.
    fn dimensions(&self) -> usize;

    fn len(&self) -> usize {
        self.records().len()
    }

    fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

/// Brute-force index scoring every record per query.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimensions: usize,
    records: Vec<VectorRecord>,
}

impl FlatIndex {
    /// Build an index, rejecting records whose embedding has the wrong length.
    pub fn from_records(dimensions: usize, records: Vec<VectorRecord>) -> AppResult<Self> {
        if let Some(bad) = records.iter().find(|r| r.embedding.len() != dimensions) {
            return Err(AppError::Embedding(format!(
                "Chunk {} has a {}-dimensional embedding, index expects {}",
                bad.chunk.chunk_index,
                bad.embedding.len(),
                dimensions
            )));
        }
        Ok(Self {
            dimensions,
            records,
        })
    }
}

impl VectorIndex for FlatIndex {
    fn search(&self, query: &[f32], top_k: usize) -> Vec<(&VectorRecord, f32)> {
        let mut scored: Vec<(&VectorRecord, f32)> = self
            .records
            .iter()
            .map(|record| (record, dot(&record.embedding, query)))
            .collect();

        scored.sort_by(|(a, a_score), (b, b_score)| {
            b_score
                .partial_cmp(a_score)
                .unwrap_or(Ordering::Equal)
                .then(a.chunk.chunk_index.cmp(&b.chunk.chunk_index))
        });
        scored.truncate(top_k);
        scored
    }

    fn records(&self) -> &[VectorRecord] {
        &self.records
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
