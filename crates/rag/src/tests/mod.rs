//! Shared test doubles and end-to-end pipeline scenarios.

pub mod fixtures;
pub mod http;


use crate::embeddings::providers::trigram::TrigramProvider;
use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use docqa_core::{AppError, AppResult};
use docqa_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const DEFAULT_REPLY: &str = "Answer\nScripted reply.";

/// Generation client replaying canned results and recording every request.
///
/// Once the script runs out every call succeeds with a fixed reply.
pub struct ScriptedLlm {
    script: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new(script: Vec<Result<&str, &str>>) -> Self {
        let script = script
            .into_iter()
            .map(|step| step.map(str::to_string).map_err(str::to_string))
            .collect();
        Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let step = self.script.lock().unwrap().pop_front();

        match step.unwrap_or_else(|| Ok(DEFAULT_REPLY.to_string())) {
            Ok(content) => Ok(LlmResponse {
                content,
                model: request.model.clone(),
                usage: LlmUsage::default(),
                done: true,
            }),
            Err(message) => Err(AppError::Llm(message)),
        }
    }
}

/// Trigram embedder that counts batch calls and yields before answering.
#[derive(Debug)]
pub struct CountingEmbedder {
    inner: TrigramProvider,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new() -> Self {
        Self {
            inner: TrigramProvider::new(384),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    fn provider_name(&self) -> &str {
        "counting"
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.inner.embed_batch(texts).await
    }
}
