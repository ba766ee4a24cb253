//! Pipeline data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of source a text unit was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Pdf,
    Text,
    Web,
}

impl SourceKind {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "text",
            Self::Web => "web",
        }
    }
}

/// Where a piece of text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name or URL
    pub source: String,

    /// Source kind
    pub kind: SourceKind,

    /// 1-based page number (PDF only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Page title (web only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl SourceMetadata {
    /// Metadata for a whole plain-text file.
    pub fn text(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind: SourceKind::Text,
            page: None,
            title: None,
        }
    }

    /// Metadata for one PDF page.
    pub fn pdf_page(source: impl Into<String>, page: u32) -> Self {
        Self {
            source: source.into(),
            kind: SourceKind::Pdf,
            page: Some(page),
            title: None,
        }
    }

    /// Metadata for a fetched web page.
    pub fn web(url: impl Into<String>, title: Option<String>) -> Self {
        Self {
            source: url.into(),
            kind: SourceKind::Web,
            page: None,
            title,
        }
    }
}

impl fmt::Display for SourceMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.page, &self.title) {
            (Some(page), _) => write!(f, "{} (page {})", self.source, page),
            (None, Some(title)) => write!(f, "{} ({})", title, self.source),
            (None, None) => write!(f, "{}", self.source),
        }
    }
}

/// Normalized text extracted from one source (a file, a PDF page or a web page).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextUnit {
    pub content: String,
    pub metadata: SourceMetadata,
}

impl TextUnit {
    pub fn new(content: impl Into<String>, metadata: SourceMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// A bounded-length segment of a text unit, the unit of indexing and retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text
    pub content: String,

    /// Metadata inherited from the originating text unit
    pub metadata: SourceMetadata,

    /// Position across the whole batch (0-based, contiguous)
    #[serde(rename = "chunkIndex")]
    pub chunk_index: u32,

    /// Number of chunks in the batch
    #[serde(rename = "totalChunks")]
    pub total_chunks: u32,
}

/// A chunk paired with its similarity to a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// A named uploaded file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// File name, used for extension dispatch and metadata
    pub name: String,

    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Input to the ingestor: files or a single URL, never both.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub files: Vec<SourceFile>,
    pub url: Option<String>,
}

impl Sources {
    /// Sources backed by uploaded files.
    pub fn files(files: Vec<SourceFile>) -> Self {
        Self { files, url: None }
    }

    /// Sources backed by one web page.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            files: Vec::new(),
            url: Some(url.into()),
        }
    }

    /// The URL, if one was given and is not blank.
    pub fn url_str(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// Statistics about a loaded corpus and its chunks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusInfo {
    pub total_documents: usize,
    pub total_characters: usize,
    pub avg_chars_per_doc: usize,
    pub total_chunks: usize,
    pub avg_chunk_size: usize,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
}

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message in a session's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            at: Utc::now(),
        }
    }
}
