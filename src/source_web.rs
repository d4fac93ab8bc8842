//! Remote content sources: HTML pages and PDF documents over HTTP.
//!
//! Pages are stripped to plain text by collecting heading, paragraph, and
//! list-item text; PDFs go through `pdf-extract`. Fetch failures are returned
//! as [`AdvisorError::ContentUnavailable`] so the corpus loader can skip the
//! source and continue.

use scraper::{Html, Selector};
use std::time::Duration;

use crate::error::{AdvisorError, Result};

/// Build the HTTP client used for all content fetches.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(AdvisorError::Http)
}

/// Fetch an HTML page and strip it to plain text.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
    let body = fetch_bytes(client, url).await?;
    let html = String::from_utf8_lossy(&body);
    let text = html_to_text(&html);
    if text.trim().is_empty() {
        return Err(AdvisorError::ContentUnavailable(format!(
            "no extractable text at {}",
            url
        )));
    }
    Ok(text)
}

/// Fetch a PDF document and extract its text.
pub async fn fetch_pdf(client: &reqwest::Client, url: &str) -> Result<String> {
    let body = fetch_bytes(client, url).await?;
    pdf_extract::extract_text_from_mem(&body)
        .map_err(|e| AdvisorError::ContentUnavailable(format!("PDF extraction failed: {}", e)))
}

async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AdvisorError::ContentUnavailable(format!("GET {} failed: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AdvisorError::ContentUnavailable(format!(
            "GET {} returned {}",
            url, status
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AdvisorError::ContentUnavailable(format!("reading {} failed: {}", url, e)))?;
    Ok(bytes.to_vec())
}

/// Strip an HTML document to readable text.
///
/// Collects text from headings, paragraphs, and list items in document
/// order, joined as paragraphs. Falls back to the whole body text when a
/// page carries none of those elements.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);

    // Static selectors; parse cannot fail on these literals.
    let content_sel = Selector::parse("h1, h2, h3, h4, p, li").unwrap();
    let body_sel = Selector::parse("body").unwrap();

    let mut blocks: Vec<String> = Vec::new();
    for el in doc.select(&content_sel) {
        let text = normalize_whitespace(&el.text().collect::<String>());
        if !text.is_empty() {
            blocks.push(text);
        }
    }

    if !blocks.is_empty() {
        return blocks.join("\n\n");
    }

    doc.select(&body_sel)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
