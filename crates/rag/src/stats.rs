//! Corpus statistics shown to the user after loading.

use crate::types::{Chunk, CorpusInfo, TextUnit};

/// Summarize loaded text units and the chunks produced from them.
///
/// Sizes are counted in characters. Averages use integer division and every
/// chunk statistic is 0 when there are no chunks.
pub fn corpus_info(units: &[TextUnit], chunks: &[Chunk]) -> CorpusInfo {
    let total_characters: usize = units.iter().map(|u| u.content.chars().count()).sum();
    let sizes: Vec<usize> = chunks.iter().map(|c| c.content.chars().count()).collect();

    CorpusInfo {
        total_documents: units.len(),
        total_characters,
        avg_chars_per_doc: total_characters.checked_div(units.len()).unwrap_or(0),
        total_chunks: sizes.len(),
        avg_chunk_size: sizes.iter().sum::<usize>().checked_div(sizes.len()).unwrap_or(0),
        min_chunk_size: sizes.iter().copied().min().unwrap_or(0),
        max_chunk_size: sizes.iter().copied().max().unwrap_or(0),
    }
}
