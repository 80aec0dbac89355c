//! Shared domain types for Pagelens.
//!
//! Pure data: capability kinds and configurations, conversation turns,
//! page context snapshots, task kinds, host-page focus records, and the
//! error taxonomy. No I/O and no async -- everything here is consumed by
//! `pagelens-core` and implemented against by `pagelens-infra`.

pub mod capability;
pub mod chat;
pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod task;
