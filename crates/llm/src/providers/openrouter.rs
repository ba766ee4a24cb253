//! OpenRouter provider implementation.
//!
//! OpenRouter exposes the OpenAI chat-completions wire format, so this
//! client also works against any OpenAI-compatible endpoint.
//! API: https://openrouter.ai/docs/api-reference/chat-completion

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default OpenRouter endpoint.
const DEFAULT_BASE_URL: &str = docqa_core::config::DEFAULT_OPENROUTER_URL;

/// Attribution headers OpenRouter uses to identify the calling app.
const REFERER: &str = "https://github.com/docqa/docqa";
const TITLE: &str = "RAG Document Assistant";

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat-completions response body.
///
/// OpenRouter sometimes answers 200 with an `error` object instead of
/// choices, so both are optional.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

/// OpenRouter chat-completions client.
pub struct OpenRouterClient {
    /// Base URL, e.g. https://openrouter.ai/api/v1
    base_url: String,

    /// Bearer token
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OpenRouterClient {
    /// Create a client against the public OpenRouter endpoint.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_config(DEFAULT_BASE_URL, api_key, Duration::from_secs(60))
    }

    /// Create a client with a custom base URL and request timeout.
    pub fn with_config(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::Llm(format!("Failed to create HTTP client for OpenRouter: {}", e))
            })?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Convert LlmRequest to the chat-completions format.
    fn to_chat_request(&self, request: &LlmRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt.clone(),
        });

        ChatRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
        }
    }

    /// Convert a chat-completions response to LlmResponse.
    fn convert_response(&self, request: &LlmRequest, response: ChatResponse) -> AppResult<LlmResponse> {
        if let Some(error) = response.error {
            return Err(AppError::Llm(describe_api_error(&error)));
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("OpenRouter returned no choices".to_string()))?;

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::Llm("OpenRouter returned an empty completion".to_string()))?;

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: response.model.unwrap_or_else(|| request.model.clone()),
            usage,
            done: choice.finish_reason.as_deref() != Some("length"),
        })
    }
}

fn describe_api_error(error: &ApiError) -> String {
    match &error.code {
        Some(code) => format!("OpenRouter API error ({}): {}", code, error.message),
        None => format!("OpenRouter API error: {}", error.message),
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenRouterClient {
    fn provider_name(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to OpenRouter");
        tracing::debug!("Request model: {}", request.model);

        let chat_request = self.to_chat_request(request);
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to OpenRouter: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorEnvelope>(&error_text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(error_text);
            return Err(AppError::Llm(format!(
                "OpenRouter API error ({}): {}",
                status, message
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse OpenRouter response: {}", e)))?;

        let response = self.convert_response(request, chat_response)?;

        tracing::info!(
            "Received completion from OpenRouter ({} tokens)",
            response.usage.total_tokens
        );

        Ok(response)
    }
}
