//! Query-time retrieval over a built index.

use crate::index::Index;
use crate::types::{Chunk, ScoredChunk};
use docqa_core::{AppError, AppResult};

/// Return the `k` chunks most similar to `query`, best first.
///
/// If `k` exceeds the index size every chunk is returned.
pub async fn retrieve(index: &Index, query: &str, k: usize) -> AppResult<Vec<Chunk>> {
    Ok(retrieve_with_scores(index, query, k)
        .await?
        .into_iter()
        .map(|scored| scored.chunk)
        .collect())
}

/// Like [`retrieve`], keeping the similarity score of each chunk.
pub async fn retrieve_with_scores(
    index: &Index,
    query: &str,
    k: usize,
) -> AppResult<Vec<ScoredChunk>> {
    if k == 0 {
        return Err(AppError::Input(
            "Number of chunks to retrieve must be greater than 0".to_string(),
        ));
    }

    let query_embedding = index.embed_query(query).await?;
    let results = index.search(&query_embedding, k);

    if let (Some(first), Some(last)) = (results.first(), results.last()) {
        tracing::debug!(
            "Retrieved {} of {} chunks (top score: {:.3}, lowest: {:.3})",
            results.len(),
            index.len(),
            first.score,
            last.score
        );
    }

    Ok(results)
}
