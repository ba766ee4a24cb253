//! Source ingestion.
//!
//! Turns uploaded files or a single web page into [`TextUnit`]s. Every source
//! is loaded independently: a file that fails to decode is logged and
//! skipped, and loading only fails when nothing at all could be extracted.

pub mod html;
pub mod pdf;
pub mod web;

use crate::types::{SourceFile, SourceMetadata, Sources, TextUnit};
use docqa_core::config::FetchSettings;
use docqa_core::{AppError, AppResult};
use futures::future::join_all;
use reqwest::Url;
use std::path::Path;
use std::time::Duration;

/// File formats the ingestor can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    PlainText,
}

impl FileFormat {
    /// Detect format from the file name's extension (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// Check that exactly one kind of source was supplied.
///
/// A blank URL counts as no URL. A URL must be absolute `http` or `https`.
pub fn validate(sources: &Sources) -> AppResult<()> {
    match (!sources.files.is_empty(), sources.url_str()) {
        (true, Some(_)) => Err(AppError::Input(
            "Provide either files or a URL, not both".to_string(),
        )),
        (false, None) => Err(AppError::Input(
            "No source provided: upload at least one file or enter a URL".to_string(),
        )),
        (false, Some(url)) => parse_url(url).map(|_| ()),
        (true, None) => Ok(()),
    }
}

fn parse_url(url: &str) -> AppResult<Url> {
    let parsed =
        Url::parse(url).map_err(|e| AppError::Input(format!("Invalid URL '{}': {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(AppError::Input(format!(
            "Unsupported URL '{}': only http and https pages can be loaded",
            url
        )));
    }
    Ok(parsed)
}

/// Loads text units from files or a web page.
#[derive(Debug, Clone)]
pub struct Ingestor {
    client: reqwest::Client,
}

impl Ingestor {
    /// Create an ingestor whose page fetches use `settings`.
    pub fn new(settings: &FetchSettings) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Load every source into text units.
    ///
    /// # Errors
    /// - `AppError::Input` if the sources are invalid (see [`validate`]) or
    ///   no text could be extracted from any of them
    pub async fn load(&self, sources: Sources) -> AppResult<Vec<TextUnit>> {
        validate(&sources)?;

        let units = match sources.url_str() {
            Some(url) => {
                let url = parse_url(url)?;
                match web::fetch_page(&self.client, &url).await {
                    Ok(units) => units,
                    Err(e) => {
                        tracing::warn!("Skipping {}: {}", url, e);
                        Vec::new()
                    }
                }
            }
            None => load_files(sources.files).await,
        };

        if units.is_empty() {
            return Err(AppError::Input(
                "No documents were successfully loaded".to_string(),
            ));
        }

        tracing::info!("Loaded {} text units", units.len());
        Ok(units)
    }
}

/// Decode files on the blocking pool, one task per file, keeping input order.
async fn load_files(files: Vec<SourceFile>) -> Vec<TextUnit> {
    let tasks = files.into_iter().filter_map(|file| {
        let Some(format) = FileFormat::from_name(&file.name) else {
            tracing::warn!("Skipping unsupported file type: {}", file.name);
            return None;
        };
        Some(tokio::task::spawn_blocking(move || {
            let result = load_file(&file, format);
            (file.name, result)
        }))
    });

    let mut units = Vec::new();
    for joined in join_all(tasks).await {
        match joined {
            Ok((_, Ok(file_units))) => units.extend(file_units),
            Ok((name, Err(e))) => tracing::warn!("Skipping {}: {}", name, e),
            Err(e) => tracing::warn!("File loading task failed: {}", e),
        }
    }
    units
}

fn load_file(file: &SourceFile, format: FileFormat) -> AppResult<Vec<TextUnit>> {
    tracing::debug!("Loading {} ({} bytes)", file.name, file.bytes.len());
    match format {
        FileFormat::Pdf => pdf::extract_pages(&file.name, &file.bytes),
        FileFormat::PlainText => Ok(decode_text(file)?.into_iter().collect()),
    }
}

fn decode_text(file: &SourceFile) -> AppResult<Option<TextUnit>> {
    let content = std::str::from_utf8(&file.bytes)
        .map_err(|e| AppError::Load(format!("'{}' is not valid UTF-8: {}", file.name, e)))?;

    if content.trim().is_empty() {
        tracing::debug!("Skipping blank file {}", file.name);
        return Ok(None);
    }

    Ok(Some(TextUnit::new(
        content,
        SourceMetadata::text(file.name.clone()),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures::pdf_with_pages;
    use crate::tests::http::serve;
    use crate::types::SourceKind;

    fn ingestor() -> Ingestor {
        Ingestor::new(&FetchSettings::default()).unwrap()
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_name("report.PDF"), Some(FileFormat::Pdf));
        assert_eq!(FileFormat::from_name("notes.txt"), Some(FileFormat::PlainText));
        assert_eq!(FileFormat::from_name("slides.pptx"), None);
        assert_eq!(FileFormat::from_name("README"), None);
    }

    #[test]
    fn test_validate_rejects_both_and_neither() {
        let both = Sources {
            files: vec![SourceFile::new("a.txt", "hello")],
            url: Some("https://example.com".to_string()),
        };
        assert!(validate(&both).unwrap_err().is_input());
        assert!(validate(&Sources::default()).unwrap_err().is_input());
        assert!(validate(&Sources::url("  ")).unwrap_err().is_input());
    }

    #[test]
    fn test_validate_urls() {
        assert!(validate(&Sources::url("https://example.com/page")).is_ok());
        assert!(validate(&Sources::url("not a url")).unwrap_err().is_input());
        assert!(validate(&Sources::url("ftp://example.com/file"))
            .unwrap_err()
            .is_input());
        assert!(validate(&Sources::url("file:///etc/passwd"))
            .unwrap_err()
            .is_input());
    }

    #[tokio::test]
    async fn test_load_text_and_pdf_in_input_order() {
        let sources = Sources::files(vec![
            SourceFile::new("first.txt", "Plain text body."),
            SourceFile::new("second.pdf", pdf_with_pages(&["Page one text", "Page two text"])),
            SourceFile::new("third.txt", "Trailing file."),
        ]);

        let units = ingestor().load(sources).await.unwrap();
        assert_eq!(units.len(), 4);
        assert_eq!(units[0].metadata, SourceMetadata::text("first.txt"));
        assert_eq!(units[1].metadata.kind, SourceKind::Pdf);
        assert_eq!(units[1].metadata.page, Some(1));
        assert!(units[1].content.contains("Page one text"));
        assert_eq!(units[2].metadata.page, Some(2));
        assert_eq!(units[3].content, "Trailing file.");
    }

    #[tokio::test]
    async fn test_bad_files_are_skipped() {
        let sources = Sources::files(vec![
            SourceFile::new("broken.pdf", b"%PDF-1.4 this is not a pdf".to_vec()),
            SourceFile::new("latin1.txt", vec![0x63, 0x61, 0x66, 0xe9]),
            SourceFile::new("image.png", vec![0x89, 0x50, 0x4e, 0x47]),
            SourceFile::new("empty.txt", "   \n"),
            SourceFile::new("good.txt", "Survivor."),
        ]);

        let units = ingestor().load(sources).await.unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].metadata.source, "good.txt");
    }

    #[tokio::test]
    async fn test_nothing_loaded_is_input_error() {
        let sources = Sources::files(vec![SourceFile::new("image.png", vec![1, 2, 3])]);
        let err = ingestor().load(sources).await.unwrap_err();
        assert!(err.is_input());
        assert!(err.to_string().contains("No documents were successfully loaded"));
    }

    #[tokio::test]
    async fn test_load_web_page() {
        let page = "<html><head><title>Tide Tables</title></head>\
                    <body><h1>High tide</h1><p>At 6&nbsp;am &amp; 6 pm.</p></body></html>";
        let (base_url, handle) = serve(200, "text/html; charset=utf-8", page, 1).await;

        let url = format!("{}/tides", base_url);
        let units = ingestor().load(Sources::url(url.clone())).await.unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].content, "High tide\nAt 6 am & 6 pm.");
        assert_eq!(
            units[0].metadata,
            SourceMetadata::web(url, Some("Tide Tables".to_string()))
        );

        let requests = handle.await.unwrap();
        assert!(requests[0].starts_with("GET /tides"));
        assert!(requests[0].to_lowercase().contains("user-agent: docqa/"));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_input_error() {
        let (base_url, _handle) = serve(404, "text/html", "<p>missing</p>", 1).await;
        let err = ingestor().load(Sources::url(base_url)).await.unwrap_err();
        assert!(err.is_input());
    }
}
