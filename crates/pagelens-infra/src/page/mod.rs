//! Page fetching and text extraction.

pub mod fetch;
pub mod source;

pub use fetch::{FetchProxy, FetchedDocument};
pub use source::LivePageSource;
