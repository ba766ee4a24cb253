//! LLM provider factory.
//!
//! This module creates generation clients from the application's
//! generation settings. It resolves the provider, checks that required
//! secrets are present and applies the request timeout.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenRouterClient};
use crate::types::ProviderType;
use docqa_core::config::{GenerationSettings, DEFAULT_OPENROUTER_URL};
use std::sync::Arc;
use std::time::Duration;

const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Create an LLM client from generation settings.
///
/// # Errors
/// Returns error if:
/// - Provider is unknown
/// - Required secrets are missing
/// - Client initialization fails
pub fn create_client(settings: &GenerationSettings) -> Result<Arc<dyn LlmClient>, String> {
    let provider = ProviderType::parse(&settings.provider)
        .ok_or_else(|| format!("Unknown provider: {}", settings.provider))?;
    let timeout = Duration::from_secs(settings.timeout_secs);

    match provider {
        ProviderType::OpenRouter => {
            let api_key = settings
                .api_key
                .as_deref()
                .ok_or_else(|| "OpenRouter provider requires API key".to_string())?;
            let client = OpenRouterClient::with_config(&settings.base_url, api_key, timeout)
                .map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        ProviderType::Ollama => {
            // The shared base URL only applies once it was moved off the OpenRouter default
            let base_url = if settings.base_url == DEFAULT_OPENROUTER_URL {
                OLLAMA_BASE_URL
            } else {
                settings.base_url.as_str()
            };
            let client = OllamaClient::with_timeout(base_url, timeout).map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
    }
}
