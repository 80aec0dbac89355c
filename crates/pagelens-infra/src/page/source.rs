//! Live [`PageSource`] over the fetch proxy.
//!
//! `is_pdf` fetches the current document and parks it; the follow-up text
//! read consumes the parked copy, so one extraction costs one fetch. The
//! parked copy never outlives an extraction -- the next `is_pdf` fetches
//! fresh.

use tokio::sync::RwLock;

use pagelens_core::context::{truncate_words, PageSource};
use pagelens_types::context::TRUNCATION_MARKER;
use pagelens_types::error::ContextError;

use super::fetch::{FetchProxy, FetchedDocument};

/// Render width for HTML-to-text conversion.
const RENDER_COLUMNS: usize = 120;

pub struct LivePageSource {
    proxy: FetchProxy,
    url: RwLock<Option<String>>,
    parked: RwLock<Option<FetchedDocument>>,
}

impl LivePageSource {
    pub fn new(proxy: FetchProxy) -> Self {
        Self {
            proxy,
            url: RwLock::new(None),
            parked: RwLock::new(None),
        }
    }

    /// The parked document if one exists, else a fresh fetch.
    async fn document(&self) -> Result<FetchedDocument, ContextError> {
        if let Some(doc) = self.parked.write().await.take() {
            return Ok(doc);
        }
        let url = self
            .url
            .read()
            .await
            .clone()
            .ok_or(ContextError::NoPage)?;
        self.proxy.fetch(&url).await
    }
}

impl PageSource for LivePageSource {
    async fn is_pdf(&self) -> bool {
        match self.document().await {
            Ok(doc) => {
                let pdf = doc.is_pdf();
                *self.parked.write().await = Some(doc);
                pdf
            }
            // The text read retries and surfaces the real error.
            Err(_) => false,
        }
    }

    async fn pdf_text(&self, max_words: usize) -> Result<String, ContextError> {
        let doc = self.document().await?;
        let text = pdf_extract::extract_text_from_mem(&doc.bytes)
            .map_err(|e| ContextError::Pdf(e.to_string()))?;

        // Bound what we hand back; the extractor applies the marker itself.
        let (bounded, _) = truncate_words(&text, max_words);
        Ok(bounded
            .strip_suffix(TRUNCATION_MARKER)
            .unwrap_or(&bounded)
            .to_string())
    }

    async fn rendered_text(&self) -> Result<String, ContextError> {
        let doc = self.document().await?;
        html2text::from_read(doc.bytes.as_slice(), RENDER_COLUMNS)
            .map_err(|e| ContextError::Read(e.to_string()))
    }

    async fn navigate(&self, url: String) {
        *self.url.write().await = Some(url);
        *self.parked.write().await = None;
    }
}
