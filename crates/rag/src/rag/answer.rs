//! Prompt assembly and answer generation.
//!
//! Retrieved chunks are concatenated into a labeled context block and sent
//! with a fixed instruction to the generation service. Generation failures
//! never escape this module: they become the answer text.

use crate::rag::types::RagAnswer;
use crate::types::Chunk;
use docqa_core::config::GenerationSettings;
use docqa_core::{AppError, AppResult};
use docqa_llm::{LlmClient, LlmRequest};
use handlebars::Handlebars;
use serde_json::json;
use std::sync::Arc;

/// Context used when retrieval found nothing.
pub const NO_CONTEXT: &str = "No relevant context found.";

/// Instruction sent as the system message with every question.
pub const SYSTEM_PROMPT: &str = "You are an AI assistant answering questions strictly from the given context.

Rules:
- Use ONLY the provided context.
- Do NOT use outside knowledge.
- If the answer is not present, say:
  \"I don't know based on the provided document.\"

Response format:
- Give ONE clear heading related to the question.
- On the next line, explain the answer in a clean paragraph.
- Do NOT use bullet points.
- Do NOT mention sources or documents.
- Keep the explanation clear and professional.";

const USER_TEMPLATE: &str = "Context:
{{context}}

Question: {{question}}

Please provide a clear and accurate answer based only on the context above.";

const TEMPLATE_NAME: &str = "question";

/// Assemble chunks into the context block, in retrieval order.
///
/// Each chunk becomes `--- Document {i} ---`, its trimmed content and an
/// empty line.
pub fn format_context(chunks: &[Chunk]) -> String {
    if chunks.is_empty() {
        return NO_CONTEXT.to_string();
    }

    chunks
        .iter()
        .enumerate()
        .flat_map(|(i, chunk)| {
            [
                format!("--- Document {} ---", i + 1),
                chunk.content.trim().to_string(),
                String::new(),
            ]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generates answers from retrieved chunks.
pub struct Answerer {
    client: Arc<dyn LlmClient>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    templates: Handlebars<'static>,
}

impl Answerer {
    /// Create an answerer sending requests through `client`.
    pub fn new(client: Arc<dyn LlmClient>, settings: &GenerationSettings) -> AppResult<Self> {
        let mut templates = Handlebars::new();

        // Context is plain text, not HTML
        templates.register_escape_fn(handlebars::no_escape);
        templates.set_strict_mode(true);
        templates
            .register_template_string(TEMPLATE_NAME, USER_TEMPLATE)
            .map_err(|e| AppError::Config(format!("Failed to register prompt template: {}", e)))?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            templates,
        })
    }

    /// Answer `question` from `chunks`.
    ///
    /// Always returns text: on failure the text describes the error.
    pub async fn answer(&self, question: &str, chunks: &[Chunk]) -> String {
        match self.generate(question, chunks).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Answer generation failed: {}", e);
                format!(
                    "Error generating answer: {}\n\nPlease check your API key and provider settings and try again.",
                    e
                )
            }
        }
    }

    /// Answer `question` and attach the chunks used as source references.
    pub async fn answer_with_sources(&self, question: &str, chunks: &[Chunk]) -> RagAnswer {
        let answer = self.answer(question, chunks).await;
        RagAnswer::new(answer, chunks)
    }

    /// Render the user message for `question`.
    pub fn render_prompt(&self, question: &str, chunks: &[Chunk]) -> AppResult<String> {
        let data = json!({
            "context": format_context(chunks),
            "question": question,
        });
        self.templates
            .render(TEMPLATE_NAME, &data)
            .map_err(|e| AppError::Other(format!("Failed to render prompt: {}", e)))
    }

    async fn generate(&self, question: &str, chunks: &[Chunk]) -> AppResult<String> {
        let prompt = self.render_prompt(question, chunks)?;

        tracing::info!(
            "Generating answer with {} context chunks (provider: {}, model: {})",
            chunks.len(),
            self.client.provider_name(),
            self.model
        );
        tracing::debug!("Prompt length: {} characters", prompt.len());

        let request = LlmRequest::new(prompt, &self.model)
            .with_system(SYSTEM_PROMPT)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let response = self.client.complete(&request).await?;

        tracing::debug!(
            "Completion used {} tokens (done: {})",
            response.usage.total_tokens,
            response.done
        );

        Ok(response.content.trim().to_string())
    }
}
