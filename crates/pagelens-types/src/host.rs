//! Host-page focus tracking and editable-surface state.
//!
//! The host page lives outside this process; the client reports the state
//! of its editable elements over the messaging channel, and the bridge
//! computes splices against that last-reported state. Node handles are
//! lookup keys, never owned references -- a node the client stops reporting
//! is treated as detached.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier the client assigns to a host-page DOM node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeHandle(String);

impl NodeHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of editable element a surface is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    /// `<input>` / `<textarea>`: value spliced at caret offsets.
    TextInput,
    /// `contenteditable` region: insert at live selection, else append.
    RichText,
}

/// A caret selection range, in byte offsets into the surface value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

/// Last-reported state of one editable element on the host page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditableSurface {
    pub node: NodeHandle,
    pub kind: SurfaceKind,
    pub value: String,
    /// Live selection, when the element currently reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
}

/// Where generated text may be inserted: the last-focused element plus the
/// caret offsets recorded at focus time, used as a fallback when the live
/// element no longer reports a selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostFocusRecord {
    pub node: NodeHandle,
    pub cursor_start: usize,
    pub cursor_end: usize,
}

/// Result of a successful insert: the new surface value for the client to
/// apply, plus the caret position after the inserted text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertOutcome {
    pub node: NodeHandle,
    pub new_value: String,
    pub caret: usize,
    /// Whether the client must re-fire the element's input-change
    /// notification so host-page frameworks observe the mutation.
    pub fires_input_event: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_handle_serde_transparent() {
        let node = NodeHandle::new("field-42");
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, "\"field-42\"");
        let parsed: NodeHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, node);
    }

    #[test]
    fn test_surface_serde_omits_empty_selection() {
        let surface = EditableSurface {
            node: NodeHandle::new("a"),
            kind: SurfaceKind::TextInput,
            value: "hi".to_string(),
            selection: None,
        };
        let json = serde_json::to_string(&surface).unwrap();
        assert!(!json.contains("selection"));
    }
}
