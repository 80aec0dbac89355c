//! System clipboard over arboard.

use pagelens_core::host::Clipboard;
use pagelens_types::error::ClipboardError;

/// Opens a fresh clipboard handle per write; arboard handles are not
/// `Sync` and writes are rare.
#[derive(Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardError(e.to_string()))
    }
}
