//! Copy/insert actions against the host page.
//!
//! Both operations mutate state outside this extension's ownership and are
//! explicitly best-effort: every failure is user-recoverable and reported
//! inline, never raised. Insertion checks liveness of the recorded element
//! before every use -- a node the client no longer reports is treated as
//! detached, not assumed valid.

use pagelens_types::chat::ConversationTurn;
use pagelens_types::error::{ClipboardError, InsertError};
use pagelens_types::host::{
    EditableSurface, HostFocusRecord, InsertOutcome, NodeHandle, SurfaceKind,
};

/// System clipboard seam. Implemented by `pagelens-infra` over arboard.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Last-reported state of the host page's editable elements.
///
/// `apply` pushes a computed splice back toward the page (and the client
/// re-fires the element's input-change notification when asked to).
pub trait HostPage: Send + Sync {
    /// Whether the node is still attached to the document.
    fn contains(&self, node: &NodeHandle) -> bool;

    /// Current state of the surface, if attached.
    fn surface(&self, node: &NodeHandle) -> Option<EditableSurface>;

    /// Apply an insert outcome to the page model.
    fn apply(&self, outcome: &InsertOutcome) -> Result<(), InsertError>;
}

/// Copy a completed turn's content to the clipboard.
pub fn copy<C: Clipboard>(clipboard: &C, turn: &ConversationTurn) -> Result<(), ClipboardError> {
    clipboard.write_text(&turn.content)
}

/// Insert a completed turn's content at the recorded caret position.
///
/// For text-input-like elements the content is spliced into the value at
/// the live selection when the element still reports one, else at the
/// caret offsets recorded at focus time. Rich editable regions insert at
/// the live selection if available, else append.
pub fn insert<H: HostPage>(
    host: &H,
    focus: Option<&HostFocusRecord>,
    turn: &ConversationTurn,
) -> Result<InsertOutcome, InsertError> {
    let focus = focus.ok_or(InsertError::NoFocusRecord)?;
    if !host.contains(&focus.node) {
        return Err(InsertError::Detached);
    }
    let surface = host.surface(&focus.node).ok_or(InsertError::Detached)?;

    let outcome = match surface.kind {
        SurfaceKind::TextInput => {
            let (start, end) = match surface.selection {
                Some(sel) => (sel.start, sel.end),
                None => (focus.cursor_start, focus.cursor_end),
            };
            splice(&surface, start, end, &turn.content, true)
        }
        SurfaceKind::RichText => match surface.selection {
            Some(sel) => splice(&surface, sel.start, sel.end, &turn.content, false),
            None => {
                let mut new_value = surface.value.clone();
                new_value.push_str(&turn.content);
                InsertOutcome {
                    node: surface.node.clone(),
                    caret: new_value.len(),
                    new_value,
                    fires_input_event: false,
                }
            }
        },
    };

    host.apply(&outcome)?;
    Ok(outcome)
}

fn splice(
    surface: &EditableSurface,
    start: usize,
    end: usize,
    text: &str,
    fires_input_event: bool,
) -> InsertOutcome {
    let start = clamp_to_boundary(&surface.value, start);
    let end = clamp_to_boundary(&surface.value, end).max(start);

    let mut new_value =
        String::with_capacity(surface.value.len() + text.len());
    new_value.push_str(&surface.value[..start]);
    new_value.push_str(text);
    new_value.push_str(&surface.value[end..]);

    InsertOutcome {
        node: surface.node.clone(),
        new_value,
        caret: start + text.len(),
        fires_input_event,
    }
}

/// Clamp a reported byte offset to a valid char boundary in `s`.
fn clamp_to_boundary(s: &str, idx: usize) -> usize {
    let mut idx = idx.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
