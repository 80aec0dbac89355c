//! OpenTelemetry GenAI Semantic Convention attribute constants.
//!
//! These follow the OTel GenAI Semantic Conventions specification so the
//! on-device capability calls instrument consistently. All constants are
//! string slices usable in `tracing::span!` and `tracing::info_span!`
//! field names.
//!
//! Span naming convention: `"{operation} {model}"` (e.g., `"summarize gemma3n"`)

// --- Required attributes ---

/// The name of the operation being performed (e.g., "chat", "summarize").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider serving the request.
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

// --- Recommended attributes ---

/// The model ID requested (e.g., "gemma3n").
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

// --- Operation name values (one per capability kind) ---

/// Freeform/chat writing through the writer capability.
pub const OP_WRITE: &str = "write";

/// Rephrasing through the rewriter capability.
pub const OP_REPHRASE: &str = "rephrase";

/// Summarization through the summarizer capability.
pub const OP_SUMMARIZE: &str = "summarize";

/// Translation through the translator capability.
pub const OP_TRANSLATE: &str = "translate";

/// Source-language detection through the language detector.
pub const OP_DETECT_LANGUAGE: &str = "detect_language";

// --- Provider name values ---

/// The local on-device runtime.
pub const PROVIDER_LOCAL_RUNTIME: &str = "local_runtime";
