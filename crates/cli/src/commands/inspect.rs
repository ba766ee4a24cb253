//! Inspect command handler.
//!
//! Runs ingestion and chunking without embedding or generation, so it works
//! without an API key.

use crate::commands::sources::SourceArgs;
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_rag::{corpus_info, ingest, ChunkConfig, Chunker, Ingestor};

/// Load and chunk sources, then print corpus statistics
#[derive(Args, Debug)]
pub struct InspectCommand {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Also list every chunk with its source
    #[arg(long)]
    pub chunks: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl InspectCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing inspect command");

        let sources = self.sources.to_sources().await?;
        ingest::validate(&sources)?;

        let ingestor = Ingestor::new(&config.fetch)?;
        let chunker = Chunker::new(ChunkConfig::new(
            config.retrieval.chunk_size,
            config.retrieval.chunk_overlap,
        )?);

        let units = ingestor.load(sources).await?;
        let chunks = chunker.split(&units);
        let info = corpus_info(&units, &chunks);

        if self.json {
            let output = if self.chunks {
                serde_json::json!({ "corpus": info, "chunks": chunks })
            } else {
                serde_json::json!({ "corpus": info })
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Documents:       {}", info.total_documents);
        println!("Characters:      {}", info.total_characters);
        println!("Avg chars/doc:   {}", info.avg_chars_per_doc);
        println!("Chunks:          {}", info.total_chunks);
        println!("Avg chunk size:  {}", info.avg_chunk_size);
        println!("Min chunk size:  {}", info.min_chunk_size);
        println!("Max chunk size:  {}", info.max_chunk_size);

        if self.chunks {
            for chunk in &chunks {
                println!();
                println!(
                    "--- Chunk {}/{} from {} ({} chars) ---",
                    chunk.chunk_index + 1,
                    chunk.total_chunks,
                    chunk.metadata,
                    chunk.content.chars().count()
                );
                println!("{}", chunk.content);
            }
        }

        Ok(())
    }
}
