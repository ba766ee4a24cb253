//! Configuration management for docqa.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - A `.env` file in the working directory
//! - A YAML config file (`docqa.yaml` or `DOCQA_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources override earlier ones.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "docqa.yaml";

/// Generation providers the CLI knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["openrouter", "ollama"];

/// Default generation endpoint.
pub const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Generation service settings
    pub generation: GenerationSettings,

    /// Chunking and retrieval settings
    pub retrieval: RetrievalSettings,

    /// Embedding backend settings
    pub embedding: EmbeddingSettings,

    /// Web page fetching settings
    pub fetch: FetchSettings,
}

/// Settings for the text-completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Provider identifier ("openrouter" or "ollama")
    pub provider: String,

    /// Environment variable holding the API key
    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: String,

    /// Resolved API key. Never read from or written to YAML.
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Base URL of the provider API
    #[serde(rename = "baseUrl")]
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Output length cap
    #[serde(rename = "maxTokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: "openrouter".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            api_key: None,
            base_url: DEFAULT_OPENROUTER_URL.to_string(),
            model: "nvidia/nemotron-3-nano-30b-a3b:free".to_string(),
            temperature: 0.3,
            max_tokens: 1000,
            timeout_secs: 60,
        }
    }
}

/// Chunking and retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Maximum chunk length in characters
    #[serde(rename = "chunkSize")]
    pub chunk_size: usize,

    /// Characters shared between adjacent chunks
    #[serde(rename = "chunkOverlap")]
    pub chunk_overlap: usize,

    /// Number of chunks handed to the answerer
    #[serde(rename = "topK")]
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
            top_k: 4,
        }
    }
}

/// Embedding backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Provider identifier ("trigram" or "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Output vector dimension
    pub dimensions: usize,

    /// Optional endpoint for HTTP providers
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

/// Settings for fetching web pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// User-Agent header sent with page requests
    #[serde(rename = "userAgent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: format!("docqa/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    generation: Option<GenerationSettings>,
    retrieval: Option<RetrievalSettings>,
    embedding: Option<EmbeddingSettings>,
    fetch: Option<FetchSettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
            generation: GenerationSettings::default(),
            retrieval: RetrievalSettings::default(),
            embedding: EmbeddingSettings::default(),
            fetch: FetchSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, the default config file and the
    /// process environment.
    ///
    /// # Example
    /// ```no_run
    /// use docqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Model: {}", config.generation.model);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None)
    }

    /// Load configuration, merging an explicit YAML file if given.
    ///
    /// Without `config_file`, `DOCQA_CONFIG` is consulted, then
    /// `docqa.yaml` in the working directory. An explicit file that does
    /// not exist is an error; the implicit default is optional.
    pub fn load_from(config_file: Option<&Path>) -> AppResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {:?}", path),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(AppError::Config(format!("Failed to read .env file: {}", e))),
        }

        let mut config = Self::default();

        let explicit = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("DOCQA_CONFIG").ok().map(PathBuf::from));

        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                config = config.merge_yaml(&path)?;
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    config = config.merge_yaml(&default_path)?;
                }
            }
        }

        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();
        result.config_file = Some(path.to_path_buf());

        if let Some(generation) = config_file.generation {
            result.generation = generation;
        }
        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(fetch) = config_file.fetch {
            result.fetch = fetch;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply environment variable overrides.
    ///
    /// `lookup` abstracts the environment so tests can feed a fixed map.
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("DOCQA_PROVIDER") {
            self.generation.provider = provider;
        }
        if let Some(base_url) = lookup("OPENROUTER_BASE_URL") {
            self.generation.base_url = base_url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.generation.model = model;
        }
        if let Some(temperature) = parse_var(&lookup, "TEMPERATURE")? {
            self.generation.temperature = temperature;
        }
        if let Some(max_tokens) = parse_var(&lookup, "MAX_TOKENS")? {
            self.generation.max_tokens = max_tokens;
        }
        if let Some(timeout) = parse_var(&lookup, "REQUEST_TIMEOUT_SECS")? {
            self.generation.timeout_secs = timeout;
        }
        self.generation.api_key = lookup(&self.generation.api_key_env)
            .filter(|key| !key.trim().is_empty());

        if let Some(chunk_size) = parse_var(&lookup, "CHUNK_SIZE")? {
            self.retrieval.chunk_size = chunk_size;
        }
        if let Some(chunk_overlap) = parse_var(&lookup, "CHUNK_OVERLAP")? {
            self.retrieval.chunk_overlap = chunk_overlap;
        }
        if let Some(top_k) = parse_var(&lookup, "RETRIEVER_K")? {
            self.retrieval.top_k = top_k;
        }

        if let Some(provider) = lookup("EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(dimensions) = parse_var(&lookup, "EMBEDDING_DIM")? {
            self.embedding.dimensions = dimensions;
        }
        if let Some(endpoint) = lookup("EMBEDDING_ENDPOINT") {
            self.embedding.endpoint = Some(endpoint);
        }

        if let Some(user_agent) = lookup("USER_AGENT") {
            self.fetch.user_agent = user_agent;
        }
        if let Some(timeout) = parse_var(&lookup, "FETCH_TIMEOUT_SECS")? {
            self.fetch.timeout_secs = timeout;
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = Some(level);
        }
        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over every other source.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        log_json: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.generation.provider = provider;
        }

        if let Some(model) = model {
            self.generation.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if log_json {
            self.log_json = true;
        }

        self
    }

    /// Validate chunking and retrieval settings.
    ///
    /// These are needed by every pipeline command, including ones that
    /// never talk to the generation service.
    pub fn validate_retrieval(&self) -> AppResult<()> {
        let retrieval = &self.retrieval;

        if retrieval.chunk_size == 0 {
            return Err(AppError::Config("chunkSize must be greater than 0".to_string()));
        }

        if retrieval.chunk_overlap >= retrieval.chunk_size {
            return Err(AppError::Config(format!(
                "chunkOverlap ({}) must be smaller than chunkSize ({})",
                retrieval.chunk_overlap, retrieval.chunk_size
            )));
        }

        if retrieval.top_k == 0 {
            return Err(AppError::Config("topK must be greater than 0".to_string()));
        }

        if self.embedding.model.trim().is_empty() {
            return Err(AppError::Config("Embedding model is not set".to_string()));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate the full configuration, including generation credentials.
    pub fn validate(&self) -> AppResult<()> {
        self.validate_retrieval()?;

        let generation = &self.generation;
        let provider = generation.provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "openrouter" && generation.api_key.is_none() {
            return Err(AppError::Config(format!(
                "{} not found in environment variables. Please set it in your .env file.",
                generation.api_key_env
            )));
        }

        if generation.model.trim().is_empty() {
            return Err(AppError::Config("Generation model is not set".to_string()));
        }

        if !(0.0..=2.0).contains(&generation.temperature) {
            return Err(AppError::Config(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                generation.temperature
            )));
        }

        Ok(())
    }

    /// Configuration summary for display.
    pub fn info(&self) -> Vec<(&'static str, String)> {
        vec![
            ("LLM Model", self.generation.model.clone()),
            ("Temperature", self.generation.temperature.to_string()),
            ("Chunk Size", self.retrieval.chunk_size.to_string()),
            ("Chunk Overlap", self.retrieval.chunk_overlap.to_string()),
            ("Retriever K", self.retrieval.top_k.to_string()),
            ("Embedding Model", self.embedding.model.clone()),
        ]
    }
}

/// Parse an optional environment value, treating garbage as a config error.
fn parse_var<T, F>(lookup: &F, key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            AppError::Config(format!("Invalid value for {}: {:?} ({})", key, raw, e))
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.generation.provider, "openrouter");
        assert_eq!(config.generation.max_tokens, 1000);
        assert_eq!(config.retrieval.chunk_size, 500);
        assert_eq!(config.retrieval.chunk_overlap, 100);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.embedding.dimensions, 384);
        assert!(!config.verbose);
    }

    #[test]
    fn test_apply_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("OPENROUTER_API_KEY", "sk-test"),
                ("LLM_MODEL", "mistralai/mistral-7b-instruct:free"),
                ("TEMPERATURE", "0.7"),
                ("CHUNK_SIZE", "800"),
                ("CHUNK_OVERLAP", "80"),
                ("RETRIEVER_K", "6"),
                ("EMBEDDING_MODEL", "nomic-embed-text"),
            ]))
            .unwrap();

        assert_eq!(config.generation.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.generation.model, "mistralai/mistral-7b-instruct:free");
        assert_eq!(config.generation.temperature, 0.7);
        assert_eq!(config.retrieval.chunk_size, 800);
        assert_eq!(config.retrieval.chunk_overlap, 80);
        assert_eq!(config.retrieval.top_k, 6);
        assert_eq!(config.embedding.model, "nomic-embed-text");
    }

    #[test]
    fn test_apply_env_rejects_garbage_numbers() {
        let mut config = AppConfig::default();
        let result = config.apply_env(env(&[("CHUNK_SIZE", "lots")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("OPENROUTER_API_KEY", "  ")])).unwrap();
        assert!(config.generation.api_key.is_none());
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            None,
            true,
            false,
            false,
        );

        assert_eq!(overridden.generation.provider, "ollama");
        assert_eq!(overridden.generation.model, "llama3.2");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_requires_api_key_for_openrouter() {
        let config = AppConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));

        let mut config = AppConfig::default();
        config.generation.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_ollama_needs_no_key() {
        let mut config = AppConfig::default();
        config.generation.provider = "ollama".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.generation.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_overlap_must_be_smaller_than_size() {
        let mut config = AppConfig::default();
        config.retrieval.chunk_overlap = 500;
        assert!(config.validate_retrieval().is_err());

        config.retrieval.chunk_overlap = 0;
        config.retrieval.top_k = 0;
        assert!(config.validate_retrieval().is_err());
    }

    #[test]
    fn test_merge_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("docqa.yaml");
        std::fs::write(
            &path,
            "generation:\n  provider: ollama\n  model: llama3.2\nretrieval:\n  chunkSize: 1000\nlogging:\n  level: debug\n  color: false\n",
        )
        .unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(merged.generation.provider, "ollama");
        assert_eq!(merged.generation.model, "llama3.2");
        // Fields missing from a section keep their defaults
        assert_eq!(merged.generation.max_tokens, 1000);
        assert_eq!(merged.retrieval.chunk_size, 1000);
        assert_eq!(merged.retrieval.chunk_overlap, 100);
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
        assert!(merged.no_color);
        assert_eq!(merged.config_file.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_info_lists_pipeline_settings() {
        let info = AppConfig::default().info();
        let labels: Vec<&str> = info.iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec![
                "LLM Model",
                "Temperature",
                "Chunk Size",
                "Chunk Overlap",
                "Retriever K",
                "Embedding Model"
            ]
        );
    }
}
