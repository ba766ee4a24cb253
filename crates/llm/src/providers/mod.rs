//! Generation provider implementations.

mod ollama;
mod openrouter;

#[cfg(test)]
mod test_server;

pub use ollama::OllamaClient;
pub use openrouter::OpenRouterClient;
