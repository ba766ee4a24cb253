//! Answer types returned to callers.

use crate::types::{Chunk, SourceMetadata};
use serde::{Deserialize, Serialize};

/// Characters of chunk text shown in a source reference.
pub const SNIPPET_CHARS: usize = 200;

/// A retrieved chunk as shown alongside an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    /// Leading text of the chunk followed by "..."
    pub snippet: String,
    pub metadata: SourceMetadata,
    pub chunk_index: u32,
}

impl From<&Chunk> for SourceRef {
    fn from(chunk: &Chunk) -> Self {
        let mut snippet: String = chunk.content.chars().take(SNIPPET_CHARS).collect();
        snippet.push_str("...");
        Self {
            snippet,
            metadata: chunk.metadata.clone(),
            chunk_index: chunk.chunk_index,
        }
    }
}

/// Answer text plus the chunks it was generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagAnswer {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub num_sources: usize,
}

impl RagAnswer {
    pub fn new(answer: String, chunks: &[Chunk]) -> Self {
        let sources: Vec<SourceRef> = chunks.iter().map(SourceRef::from).collect();
        Self {
            answer,
            num_sources: sources.len(),
            sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str) -> Chunk {
        Chunk {
            content: content.to_string(),
            metadata: SourceMetadata::pdf_page("manual.pdf", 4),
            chunk_index: 7,
            total_chunks: 9,
        }
    }

    #[test]
    fn test_snippet_truncated_to_200_chars() {
        let source = SourceRef::from(&chunk(&"ü".repeat(350)));
        assert_eq!(source.snippet.chars().count(), SNIPPET_CHARS + 3);
        assert!(source.snippet.ends_with("..."));
        assert_eq!(source.chunk_index, 7);
    }

    #[test]
    fn test_short_chunk_still_gets_ellipsis() {
        assert_eq!(SourceRef::from(&chunk("Short.")).snippet, "Short....");
    }

    #[test]
    fn test_answer_serialization() {
        let answer = RagAnswer::new("Heading\nBody".to_string(), &[chunk("Text")]);
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["numSources"], 1);
        assert_eq!(json["sources"][0]["chunkIndex"], 7);
        assert_eq!(json["sources"][0]["metadata"]["page"], 4);
    }
}
