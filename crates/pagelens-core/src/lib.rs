//! Core orchestration logic for Pagelens.
//!
//! Everything the page-context-aware chat needs between the UI and the
//! on-device AI runtime: capability traits and their box wrappers, the
//! availability prober, the one-session-per-kind registry, the bounded
//! page-context extractor, the task dispatcher, the streaming renderer,
//! and the host-page bridge. Collaborator implementations (the actual
//! runtime client, page fetchers, clipboard) live in `pagelens-infra`.

pub mod capability;
pub mod chat;
pub mod context;
pub mod event;
pub mod host;
pub mod markdown;
