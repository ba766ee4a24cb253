//! Source selection flags shared by the pipeline commands.

use clap::Args;
use docqa_core::{AppError, AppResult};
use docqa_rag::{SourceFile, Sources};
use std::path::{Path, PathBuf};

/// Files or a web page to answer from
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// PDF or plain-text file (repeatable)
    #[arg(short, long = "file")]
    pub files: Vec<PathBuf>,

    /// Web page to load instead of files
    #[arg(short, long)]
    pub url: Option<String>,
}

impl SourceArgs {
    /// Read every file into memory.
    ///
    /// Exactly-one-kind validation happens in the pipeline, so both or
    /// neither are passed through unchanged. Unreadable files are skipped.
    pub async fn to_sources(&self) -> AppResult<Sources> {
        let paths: Vec<&Path> = self.files.iter().map(PathBuf::as_path).collect();
        Ok(Sources {
            files: read_files(&paths).await?,
            url: self.url.clone(),
        })
    }
}

/// Parse a chat `/new` argument list: one URL or any number of paths.
pub async fn parse_sources(args: &[&str]) -> AppResult<Sources> {
    match args {
        [url] if url.starts_with("http://") || url.starts_with("https://") => {
            Ok(Sources::url(*url))
        }
        paths => {
            let paths: Vec<&Path> = paths.iter().map(Path::new).collect();
            Ok(Sources::files(read_files(&paths).await?))
        }
    }
}

/// Read `paths`, warning about and skipping the ones that fail.
///
/// Fails only when paths were given and none could be read.
async fn read_files(paths: &[&Path]) -> AppResult<Vec<SourceFile>> {
    let mut files = Vec::with_capacity(paths.len());
    let mut last_error = None;

    for path in paths {
        match read_file(path).await {
            Ok(file) => files.push(file),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if files.is_empty() => Err(e),
        _ => Ok(files),
    }
}

async fn read_file(path: &Path) -> AppResult<SourceFile> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        AppError::Input(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SourceFile::new(name, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_files_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Some notes.").unwrap();

        let args = SourceArgs {
            files: vec![path],
            url: None,
        };
        let sources = args.to_sources().await.unwrap();
        assert_eq!(sources.files.len(), 1);
        assert_eq!(sources.files[0].name, "notes.txt");
        assert_eq!(sources.files[0].bytes, b"Some notes.");
    }

    #[tokio::test]
    async fn test_missing_file_is_input_error() {
        let args = SourceArgs {
            files: vec![PathBuf::from("/nonexistent/docqa/missing.txt")],
            url: None,
        };
        assert!(args.to_sources().await.unwrap_err().is_input());
    }

    #[tokio::test]
    async fn test_unreadable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.txt");
        std::fs::write(&good, "Readable.").unwrap();

        let args = SourceArgs {
            files: vec![good, dir.path().join("missing.txt")],
            url: None,
        };
        let sources = args.to_sources().await.unwrap();
        assert_eq!(sources.files.len(), 1);
        assert_eq!(sources.files[0].name, "good.txt");

        let missing = dir.path().join("missing.txt");
        let good = dir.path().join("good.txt");
        let chat = parse_sources(&[missing.to_str().unwrap(), good.to_str().unwrap()])
            .await
            .unwrap();
        assert_eq!(chat.files.len(), 1);
    }

    #[tokio::test]
    async fn test_parse_chat_sources() {
        let sources = parse_sources(&["https://example.com/a"]).await.unwrap();
        assert_eq!(sources.url_str(), Some("https://example.com/a"));
        assert!(sources.files.is_empty());

        let sources = parse_sources(&[]).await.unwrap();
        assert!(sources.files.is_empty() && sources.url.is_none());
    }
}
