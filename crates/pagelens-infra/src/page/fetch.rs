//! Document fetching for context extraction.
//!
//! The extension client cannot hand us a live DOM, so the page is
//! re-fetched server-side by URL. Cross-origin restrictions do not apply
//! here; the proxy sees exactly what an unauthenticated GET sees.

use pagelens_types::error::ContextError;

/// A fetched document body plus the metadata PDF detection needs.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub url: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FetchedDocument {
    /// PDF detection: declared content type, URL extension, or the magic
    /// bytes at the start of the body.
    pub fn is_pdf(&self) -> bool {
        if let Some(content_type) = &self.content_type {
            if content_type.contains("application/pdf") {
                return true;
            }
        }
        let path = self.url.split(['?', '#']).next().unwrap_or(&self.url);
        path.to_ascii_lowercase().ends_with(".pdf") || self.bytes.starts_with(b"%PDF-")
    }
}

/// HTTP fetcher for page documents.
#[derive(Clone)]
pub struct FetchProxy {
    http: reqwest::Client,
}

impl FetchProxy {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// GET a document, failing on non-success statuses.
    pub async fn fetch(&self, url: &str) -> Result<FetchedDocument, ContextError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ContextError::Fetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| ContextError::Fetch(e.to_string()))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ContextError::Fetch(e.to_string()))?;

        Ok(FetchedDocument {
            url: url.to_string(),
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

impl Default for FetchProxy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(url: &str, content_type: Option<&str>, bytes: &[u8]) -> FetchedDocument {
        FetchedDocument {
            url: url.to_string(),
            content_type: content_type.map(|s| s.to_string()),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_pdf_by_content_type() {
        assert!(doc("https://a.example/x", Some("application/pdf"), b"").is_pdf());
        assert!(!doc("https://a.example/x", Some("text/html; charset=utf-8"), b"").is_pdf());
    }

    #[test]
    fn test_pdf_by_url_extension() {
        assert!(doc("https://a.example/report.PDF", None, b"").is_pdf());
        assert!(doc("https://a.example/report.pdf?dl=1", None, b"").is_pdf());
        assert!(!doc("https://a.example/page?file=x.pdf", None, b"").is_pdf());
    }

    #[test]
    fn test_pdf_by_magic_bytes() {
        assert!(doc("https://a.example/download", None, b"%PDF-1.7 rest").is_pdf());
        assert!(!doc("https://a.example/download", None, b"<!doctype html>").is_pdf());
    }
}
