//! Conversation state for one loaded corpus.
//!
//! A [`Session`] owns the chat history and the live index. The index is
//! built lazily on the first question (or an explicit [`Session::load`]) and
//! at most one build runs at a time: concurrent callers wait on the same
//! build. [`Session::new_document`] discards the corpus and history.

use crate::chunker::{ChunkConfig, Chunker};
use crate::embeddings::EmbeddingProvider;
use crate::index::Index;
use crate::ingest::{self, Ingestor};
use crate::rag::{Answerer, RagAnswer};
use crate::retriever::{retrieve, retrieve_with_scores};
use crate::stats::corpus_info;
use crate::types::{ChatTurn, Chunk, CorpusInfo, ScoredChunk, Sources};
use chrono::{DateTime, Utc};
use docqa_core::{AppConfig, AppError, AppResult};
use docqa_llm::LlmClient;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell, RwLock};
use uuid::Uuid;

/// A built index and the statistics of the corpus behind it.
#[derive(Debug)]
struct LoadedCorpus {
    index: Index,
    info: CorpusInfo,
}

type CorpusSlot = Arc<OnceCell<Arc<LoadedCorpus>>>;

/// Question-answering session over one corpus.
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    top_k: usize,
    ingestor: Ingestor,
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
    answerer: Answerer,
    history: Mutex<Vec<ChatTurn>>,
    corpus: RwLock<CorpusSlot>,
}

impl Session {
    /// Create a session from validated configuration.
    ///
    /// # Errors
    /// `AppError::Config` if the chunking or retrieval settings are invalid.
    pub fn new(
        config: &AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmClient>,
    ) -> AppResult<Self> {
        let retrieval = &config.retrieval;
        if retrieval.top_k == 0 {
            return Err(AppError::Config(
                "Retriever k must be greater than 0".to_string(),
            ));
        }
        let chunk_config = ChunkConfig::new(retrieval.chunk_size, retrieval.chunk_overlap)?;

        let session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            top_k: retrieval.top_k,
            ingestor: Ingestor::new(&config.fetch)?,
            chunker: Chunker::new(chunk_config),
            embedder,
            answerer: Answerer::new(llm, &config.generation)?,
            history: Mutex::new(Vec::new()),
            corpus: RwLock::new(Arc::new(OnceCell::new())),
        };

        tracing::debug!("Created session {}", session.id);
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Load and index `sources` unless a corpus is already loaded.
    pub async fn load(&self, sources: Sources) -> AppResult<CorpusInfo> {
        ingest::validate(&sources)?;
        Ok(self.loaded_corpus(sources).await?.info.clone())
    }

    /// Answer `question`, loading `sources` first if needed.
    ///
    /// Both turns are recorded in the history. A load failure is recorded as
    /// the assistant turn and returned; a generation failure becomes the
    /// answer text.
    pub async fn ask(&self, sources: Sources, question: &str) -> AppResult<String> {
        Ok(self.ask_with_sources(sources, question).await?.answer)
    }

    /// Like [`Session::ask`], also returning the chunks the answer used.
    pub async fn ask_with_sources(&self, sources: Sources, question: &str) -> AppResult<RagAnswer> {
        ingest::validate(&sources)?;
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Input("Question must not be empty".to_string()));
        }

        self.record(ChatTurn::user(question)).await;

        let chunks = match self.retrieve_for(sources, question).await {
            Ok(chunks) => chunks,
            Err(e) => {
                self.record(ChatTurn::assistant(format!("Error: {}", e))).await;
                return Err(e);
            }
        };

        let answer = self.answerer.answer_with_sources(question, &chunks).await;
        self.record(ChatTurn::assistant(answer.answer.clone())).await;
        Ok(answer)
    }

    async fn retrieve_for(&self, sources: Sources, question: &str) -> AppResult<Vec<Chunk>> {
        let corpus = self.loaded_corpus(sources).await?;
        retrieve(&corpus.index, question, self.top_k).await
    }

    /// Scored chunks for `question` from the loaded corpus, for display.
    pub async fn sources_for(&self, question: &str) -> AppResult<Vec<ScoredChunk>> {
        let slot = self.corpus.read().await.clone();
        let corpus = slot
            .get()
            .ok_or_else(|| AppError::Input("No document loaded".to_string()))?;
        retrieve_with_scores(&corpus.index, question, self.top_k).await
    }

    /// Discard the corpus and chat history.
    ///
    /// Calls already holding the old index finish against it.
    pub async fn new_document(&self) {
        *self.corpus.write().await = Arc::new(OnceCell::new());
        self.history.lock().await.clear();
        tracing::info!("Session {} reset for a new document", self.id);
    }

    pub async fn is_loaded(&self) -> bool {
        self.corpus.read().await.initialized()
    }

    pub async fn corpus_info(&self) -> Option<CorpusInfo> {
        let slot = self.corpus.read().await.clone();
        slot.get().map(|corpus| corpus.info.clone())
    }

    pub async fn history(&self) -> Vec<ChatTurn> {
        self.history.lock().await.clone()
    }

    async fn record(&self, turn: ChatTurn) {
        self.history.lock().await.push(turn);
    }

    /// The live corpus, building it from `sources` if the slot is empty.
    async fn loaded_corpus(&self, sources: Sources) -> AppResult<Arc<LoadedCorpus>> {
        let slot = self.corpus.read().await.clone();
        let corpus = slot
            .get_or_try_init(|| self.build_corpus(sources))
            .await?;
        Ok(Arc::clone(corpus))
    }

    async fn build_corpus(&self, sources: Sources) -> AppResult<Arc<LoadedCorpus>> {
        let units = self.ingestor.load(sources).await?;
        let chunks = self.chunker.split(&units);
        let info = corpus_info(&units, &chunks);

        tracing::info!(
            "Loaded {} documents ({} characters) into {} chunks",
            info.total_documents,
            info.total_characters,
            info.total_chunks
        );

        let index = Index::build(chunks, Arc::clone(&self.embedder)).await?;
        Ok(Arc::new(LoadedCorpus { index, info }))
    }
}
