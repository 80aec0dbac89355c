//! Bounded page-context extraction.

pub mod extractor;
pub mod normalize;

pub use extractor::{ContextExtractor, PageSource};
pub use normalize::{normalize_page_text, truncate_words};
