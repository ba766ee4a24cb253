//! Command handlers for the docqa CLI.

pub mod ask;
pub mod chat;
pub mod inspect;
pub mod settings;
pub mod sources;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use inspect::InspectCommand;
pub use settings::SettingsCommand;

use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_llm::LlmClient;
use docqa_rag::{create_provider, EmbeddingConfig, EmbeddingProvider, Session};

/// Create the embedding and generation backends and a fresh session.
pub async fn open_session(config: &AppConfig) -> AppResult<Session> {
    let embedder = create_provider(&EmbeddingConfig::from(&config.embedding)).await?;
    let llm = docqa_llm::create_client(&config.generation).map_err(AppError::Config)?;

    tracing::debug!(
        "Generation: {} ({}), embeddings: {} ({})",
        llm.provider_name(),
        config.generation.model,
        embedder.provider_name(),
        embedder.model_name()
    );

    Session::new(config, embedder, llm)
}
