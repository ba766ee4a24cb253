//! Generation service integration for docqa.
//!
//! This crate provides a provider-agnostic abstraction over text-completion
//! services. The pipeline only ever sees the `LlmClient` trait: one request
//! with a system instruction and a user prompt in, one completion out.
//!
//! # Providers
//! - **OpenRouter**: OpenAI-compatible chat completions (default)
//! - **Ollama**: Local LLM runtime
//!
//! # Example
//! ```no_run
//! use docqa_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenRouterClient};
pub use types::ProviderType;
