//! Web page fetching.

use crate::ingest::html;
use crate::types::{SourceMetadata, TextUnit};
use docqa_core::{AppError, AppResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;

/// Fetch `url` and extract its visible text as a single unit.
///
/// Returns no units when the page has no visible text.
pub async fn fetch_page(client: &reqwest::Client, url: &Url) -> AppResult<Vec<TextUnit>> {
    tracing::info!("Fetching {}", url);

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| AppError::Load(format!("Failed to fetch {}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Load(format!("Fetching {} returned {}", url, status)));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/html")
        .to_ascii_lowercase();

    let body = response
        .text()
        .await
        .map_err(|e| AppError::Load(format!("Failed to read body of {}: {}", url, e)))?;

    let page = if content_type.starts_with("text/plain") {
        html::PageText {
            title: None,
            text: body,
        }
    } else if content_type.contains("html") || content_type.contains("xml") {
        html::extract_text(&body)
    } else {
        return Err(AppError::Load(format!(
            "Unsupported content type '{}' at {}",
            content_type, url
        )));
    };

    tracing::debug!("Extracted {} characters from {}", page.text.len(), url);

    if page.text.trim().is_empty() {
        tracing::debug!("No visible text at {}", url);
        return Ok(Vec::new());
    }

    Ok(vec![TextUnit::new(
        page.text,
        SourceMetadata::web(url.as_str(), page.title),
    )])
}
