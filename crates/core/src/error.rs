//! Error types for docqa.
//!
//! One enum covers every failure category of the question-answering
//! pipeline. Which layer absorbs which variant is part of the contract:
//! `Load` stops at the ingestion boundary, `Llm` stops at the answerer,
//! everything else reaches the caller.

use thiserror::Error;

/// Unified error type for docqa.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller supplied unusable input (no source, both sources, empty corpus)
    #[error("Input error: {0}")]
    Input(String),

    /// A single file, page or URL could not be loaded
    #[error("Load error: {0}")]
    Load(String),

    /// Embedding backend failures
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Generation service errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether this error came from bad caller input rather than the environment.
    pub fn is_input(&self) -> bool {
        matches!(self, AppError::Input(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = AppError::Input("No documents were successfully loaded".to_string());
        assert_eq!(
            err.to_string(),
            "Input error: No documents were successfully loaded"
        );
        assert!(err.is_input());

        let err = AppError::Llm("rate limited".to_string());
        assert_eq!(err.to_string(), "LLM error: rate limited");
        assert!(!err.is_input());
    }

    #[test]
    fn test_from_serde_json() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
