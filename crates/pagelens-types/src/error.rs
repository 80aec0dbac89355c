use thiserror::Error;

use crate::capability::{CapabilityError, CapabilityKind};

/// Errors from page-context extraction collaborators.
///
/// These never reach the chat as failures: the extractor degrades to
/// "no context available" and the caller proceeds without a preamble.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("pdf extraction failed: {0}")]
    Pdf(String),

    #[error("page read failed: {0}")]
    Read(String),

    #[error("no page loaded")]
    NoPage,
}

/// Errors from the clipboard collaborator.
#[derive(Debug, Error)]
#[error("clipboard write failed: {0}")]
pub struct ClipboardError(pub String);

/// Errors from inserting generated text into the host page.
///
/// All variants are user-recoverable; the chat renders them inline with
/// guidance instead of raising them.
#[derive(Debug, Error)]
pub enum InsertError {
    #[error("no text field has been focused yet -- click into a text field first")]
    NoFocusRecord,

    #[error("the focused element is no longer on the page -- click into a text field first")]
    Detached,

    #[error("could not update the text field: {0}")]
    Surface(String),
}

/// Top-level chat error taxonomy.
///
/// Every variant is surfaced as an inline conversational/system message;
/// none escapes to the host page as an uncaught failure.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("no AI capability is available on this device")]
    CapabilityUnavailable,

    #[error("could not start the '{kind}' capability: {message}")]
    SessionCreation {
        kind: CapabilityKind,
        message: String,
    },

    #[error("generation stopped early: {0}")]
    Streaming(String),

    #[error("page context unavailable: {0}")]
    ContextExtraction(String),

    #[error(transparent)]
    HostInsert(#[from] InsertError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error("unknown turn: {0}")]
    UnknownTurn(uuid::Uuid),

    #[error("turn is still streaming or failed; copy/insert needs a completed turn")]
    TurnNotReady,

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_error_guidance() {
        let err = InsertError::NoFocusRecord;
        assert!(err.to_string().contains("click into a text field"));
        let err = InsertError::Detached;
        assert!(err.to_string().contains("click into a text field"));
    }

    #[test]
    fn test_session_creation_display() {
        let err = ChatError::SessionCreation {
            kind: CapabilityKind::Summarizer,
            message: "download quota exceeded".to_string(),
        };
        assert!(err.to_string().contains("summarizer"));
        assert!(err.to_string().contains("download quota exceeded"));
    }

    #[test]
    fn test_capability_error_converts() {
        let err: ChatError = CapabilityError::SessionClosed.into();
        assert!(matches!(err, ChatError::Capability(_)));
    }
}
