//! Retrieval-augmented question answering over uploaded documents.
//!
//! The pipeline runs in five stages:
//! 1. [`ingest`] turns PDF/text files or one web page into text units
//! 2. [`chunker`] splits units into overlapping chunks
//! 3. [`index`] embeds every chunk into an in-memory vector index
//! 4. [`retriever`] returns the chunks closest to a question
//! 5. [`rag`] assembles the context and asks the generation service
//!
//! [`Session`] ties the stages together and keeps the chat history.

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod rag;
pub mod retriever;
pub mod session;
pub mod stats;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

pub use chunker::{ChunkConfig, Chunker};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use index::Index;
pub use ingest::Ingestor;
pub use rag::{Answerer, RagAnswer, SourceRef};
pub use retriever::{retrieve, retrieve_with_scores};
pub use session::Session;
pub use stats::corpus_info;
pub use types::{
    ChatTurn, Chunk, CorpusInfo, Role, ScoredChunk, SourceFile, SourceKind, SourceMetadata,
    Sources, TextUnit,
};
