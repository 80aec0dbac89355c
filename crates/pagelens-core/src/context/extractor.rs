//! Page-context extractor with stale-while-revalidate caching.
//!
//! Decision order per extraction: if the source reports a PDF document,
//! delegate to the PDF collaborator (which may fail -- the extractor then
//! degrades to "no context" instead of erroring); otherwise read the
//! rendered page text, normalize whitespace, and truncate to the word
//! budget. Only one extraction runs at a time; a request arriving while
//! one is in flight gets the previous cached snapshot.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Mutex;

use pagelens_types::context::{PageContextSnapshot, PageSourceKind};
use pagelens_types::error::ContextError;

use super::normalize::{normalize_page_text, truncate_words};

/// The current document, as seen by the client.
///
/// Implementations live in `pagelens-infra` (fetch proxy + html2text /
/// pdf-extract); tests use scripted fakes.
pub trait PageSource: Send + Sync {
    /// Whether the current document is a PDF.
    fn is_pdf(&self) -> impl std::future::Future<Output = bool> + Send;

    /// Extracted PDF text, bounded to `max_words` by the collaborator.
    fn pdf_text(
        &self,
        max_words: usize,
    ) -> impl std::future::Future<Output = Result<String, ContextError>> + Send;

    /// The page's rendered plain text (unbounded, un-normalized).
    fn rendered_text(
        &self,
    ) -> impl std::future::Future<Output = Result<String, ContextError>> + Send;

    /// Point the source at a new document.
    fn navigate(&self, url: String) -> impl std::future::Future<Output = ()> + Send;
}

/// Computes and caches [`PageContextSnapshot`]s.
pub struct ContextExtractor<P: PageSource> {
    source: P,
    max_words: usize,
    cached: Mutex<Option<PageContextSnapshot>>,
    version: AtomicU64,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag even when extraction bails early.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<P: PageSource> ContextExtractor<P> {
    pub fn new(source: P, max_words: usize) -> Self {
        Self {
            source,
            max_words,
            cached: Mutex::new(None),
            version: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Access the underlying page source.
    pub fn source(&self) -> &P {
        &self.source
    }

    /// Produce a snapshot of the current page, or `None` when no context
    /// is available (extraction failed or the page is empty).
    ///
    /// With `force_refresh` the cache is bypassed and replaced wholesale;
    /// otherwise a cached snapshot is returned as-is. A call arriving
    /// while another extraction is in flight returns the stale cached
    /// snapshot rather than blocking.
    pub async fn extract(&self, force_refresh: bool) -> Option<PageContextSnapshot> {
        if !force_refresh {
            if let Some(snapshot) = self.cached.lock().await.clone() {
                return Some(snapshot);
            }
        }

        if self.in_flight.swap(true, Ordering::SeqCst) {
            // Stale-while-revalidate: someone else is extracting.
            return self.cached.lock().await.clone();
        }
        let _guard = InFlightGuard(&self.in_flight);

        let snapshot = self.extract_fresh().await?;
        *self.cached.lock().await = Some(snapshot.clone());
        Some(snapshot)
    }

    /// Drop the cached snapshot (page navigation).
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn extract_fresh(&self) -> Option<PageContextSnapshot> {
        let (source_kind, raw) = if self.source.is_pdf().await {
            match self.source.pdf_text(self.max_words).await {
                Ok(text) => (PageSourceKind::PdfDocument, text),
                Err(err) => {
                    tracing::warn!(error = %err, "pdf extraction failed; no context available");
                    return None;
                }
            }
        } else {
            match self.source.rendered_text().await {
                Ok(text) => (PageSourceKind::HtmlDocument, text),
                Err(err) => {
                    tracing::warn!(error = %err, "page read failed; no context available");
                    return None;
                }
            }
        };

        let normalized = normalize_page_text(&raw);
        if normalized.is_empty() {
            return None;
        }
        let (text, truncated) = truncate_words(&normalized, self.max_words);
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::debug!(
            source = %source_kind,
            version,
            truncated,
            words = text.split_whitespace().count(),
            "page context extracted"
        );

        Some(PageContextSnapshot {
            source_kind,
            text,
            version,
            truncated,
        })
    }
}
