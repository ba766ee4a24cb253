//! Ask command handler.
//!
//! Loads the given sources, answers one question and exits.

use crate::commands::open_session;
use crate::commands::sources::SourceArgs;
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};

/// Ask one question about files or a web page
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    #[command(flatten)]
    pub sources: SourceArgs,

    /// Print the retrieved passages after the answer
    #[arg(long = "sources")]
    pub show_sources: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let sources = self.sources.to_sources().await?;
        let session = open_session(config).await?;
        let result = session.ask_with_sources(sources, &self.question).await?;

        if self.json {
            let output = serde_json::json!({
                "question": self.question,
                "answer": result.answer,
                "sources": result.sources,
                "numSources": result.num_sources,
                "model": config.generation.model,
                "provider": config.generation.provider,
                "corpus": session.corpus_info().await,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("{}", result.answer);

        if self.show_sources {
            println!();
            println!("Sources ({}):", result.num_sources);
            for (i, source) in result.sources.iter().enumerate() {
                println!("  [{}] {} (chunk {})", i + 1, source.metadata, source.chunk_index);
                println!("      {}", source.snippet.replace('\n', " "));
            }
        }

        Ok(())
    }
}
