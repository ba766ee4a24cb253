//! Recursive-separator text chunking with overlap.
//!
//! Text is split on the highest-priority separator it contains (paragraph
//! break, line break, sentence end, space, then single characters). Small
//! pieces are merged back into windows of at most `chunk_size` characters,
//! and each new window starts with the tail of the previous one so that
//! adjacent chunks share up to `chunk_overlap` characters.

use crate::types::{Chunk, TextUnit};
use docqa_core::{AppError, AppResult};
use std::collections::VecDeque;

/// Separators in priority order. The empty separator cuts between characters.
pub const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Chunk size and overlap, both in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl ChunkConfig {
    /// Create a validated chunk configuration.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::Config("Chunk size must be greater than 0".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
        }
    }
}

/// Splits text units into overlapping, bounded-size chunks.
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split every unit and number the resulting chunks across the whole batch.
    pub fn split(&self, units: &[TextUnit]) -> Vec<Chunk> {
        let mut chunks: Vec<Chunk> = units
            .iter()
            .flat_map(|unit| {
                self.split_text(&unit.content)
                    .into_iter()
                    .map(move |content| Chunk {
                        content,
                        metadata: unit.metadata.clone(),
                        chunk_index: 0,
                        total_chunks: 0,
                    })
            })
            .collect();

        let total = chunks.len() as u32;
        for (i, chunk) in chunks.iter_mut().enumerate() {
            chunk.chunk_index = i as u32;
            chunk.total_chunks = total;
        }

        tracing::debug!(
            "Split {} text units into {} chunks (size: {}, overlap: {})",
            units.len(),
            total,
            self.config.chunk_size,
            self.config.chunk_overlap
        );

        chunks
    }

    /// Split a single text into trimmed, non-empty chunk contents.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if char_len(text) <= self.config.chunk_size {
            let trimmed = text.trim();
            return if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            };
        }
        self.split_recursive(text, &SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // "" always matches, so the fallback is the last entry
        let (position, separator) = separators
            .iter()
            .enumerate()
            .find(|(_, sep)| sep.is_empty() || text.contains(**sep))
            .map(|(i, sep)| (i, *sep))
            .unwrap_or((separators.len(), ""));
        let remaining = separators.get(position + 1..).unwrap_or(&[]);

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.config.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge(&pending));
                pending.clear();
            }

            if separator.is_empty() || remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge(&pending));
        }

        chunks
    }

    /// Merge small pieces into windows of at most `chunk_size` characters.
    ///
    /// When the next piece would overflow the window, the window is emitted
    /// and pieces are dropped from its front until what remains is at most
    /// `chunk_overlap` long (and leaves room for the next piece). The
    /// retained suffix becomes the start of the next window.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let ChunkConfig {
            chunk_size,
            chunk_overlap,
        } = self.config;

        let mut merged = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > chunk_size && !window.is_empty() {
                push_joined(&mut merged, &window);

                while total > chunk_overlap || (total > 0 && total + len > chunk_size) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        push_joined(&mut merged, &window);
        merged
    }
}

fn push_joined(out: &mut Vec<String>, window: &VecDeque<(&str, usize)>) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

/// Split `text` at every occurrence of `separator`, keeping the separator at
/// the start of the following piece. The empty separator splits into
/// characters. Empty pieces are dropped.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, _) in text.match_indices(separator) {
        if i > start {
            pieces.push(&text[start..i]);
        }
        start = i;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
