//! Infrastructure implementations for Pagelens.
//!
//! The concrete ends of the seams `pagelens-core` defines: a capability
//! factory backed by a local OpenAI-compatible model runtime, a page
//! source that fetches and extracts document text, and the system
//! clipboard.

pub mod clipboard;
pub mod page;
pub mod runtime;
