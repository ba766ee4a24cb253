//! Trigram embedding provider using hashed character trigrams and words.

use crate::embeddings::config::DEFAULT_BATCH_SIZE;
use crate::embeddings::{normalize, EmbeddingProvider};
use docqa_core::AppResult;
use std::collections::BTreeMap;

const STOP_WORDS: [&str; 33] = [
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what",
];

/// The only model the trigram provider implements.
pub const MODEL: &str = "trigram-v1";

/// Trigram-based embedding provider for local, offline operation.
///
/// Generates deterministic embeddings from character trigrams and word
/// frequencies. It is not a semantic model, but identical text always maps
/// to the identical vector and texts sharing vocabulary score close to each
/// other, which is enough for retrieval over a single document.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
    batch_size: usize,
}

impl TrigramProvider {
    /// Create a new trigram provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];
        if self.dimensions == 0 {
            return embedding;
        }

        let lower = text.to_lowercase();

        // Ordered map keeps float accumulation order stable across runs
        let mut word_freq: BTreeMap<&str, u32> = BTreeMap::new();
        for word in content_words(&lower) {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for trigram in chars.windows(3) {
                let hash = trigram
                    .iter()
                    .collect::<String>()
                    .bytes()
                    .fold(0u64, |acc, b| acc.wrapping_mul(37).wrapping_add(b as u64));
                embedding[(hash as usize) % self.dimensions] += (*freq as f32).sqrt();
            }

            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(word_hash as usize) % self.dimensions] += *freq as f32;
        }

        normalize(&mut embedding);
        embedding
    }
}

/// Words that carry meaning, falling back to every token (and then to the
/// whole text) so that non-blank text never embeds to the zero vector.
fn content_words(lower: &str) -> Vec<&str> {
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let words: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        .collect();
    if !words.is_empty() {
        return words;
    }
    if !tokens.is_empty() {
        return tokens;
    }

    let trimmed = lower.trim();
    if trimmed.is_empty() {
        Vec::new()
    } else {
        vec![trimmed]
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        MODEL
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}
