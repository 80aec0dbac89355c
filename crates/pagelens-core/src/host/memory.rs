//! In-memory model of the host page's editable surfaces.
//!
//! The client reports focus and detachment over the messaging channel;
//! this map holds the last-reported state that the bridge splices against.
//! Nodes are keyed by the opaque handle the client assigned.

use dashmap::DashMap;

use pagelens_types::error::InsertError;
use pagelens_types::host::{EditableSurface, InsertOutcome, NodeHandle, Selection};

use super::bridge::HostPage;

/// Thread-safe surface map backing the [`HostPage`] trait.
#[derive(Default)]
pub struct InMemoryHostPage {
    surfaces: DashMap<NodeHandle, EditableSurface>,
}

impl InMemoryHostPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the state of a focused editable element.
    pub fn report_focus(&self, surface: EditableSurface) {
        self.surfaces.insert(surface.node.clone(), surface);
    }

    /// The client reported the node was removed from the document.
    pub fn report_detached(&self, node: &NodeHandle) {
        self.surfaces.remove(node);
    }
}

impl HostPage for InMemoryHostPage {
    fn contains(&self, node: &NodeHandle) -> bool {
        self.surfaces.contains_key(node)
    }

    fn surface(&self, node: &NodeHandle) -> Option<EditableSurface> {
        self.surfaces.get(node).map(|entry| entry.clone())
    }

    fn apply(&self, outcome: &InsertOutcome) -> Result<(), InsertError> {
        let mut entry = self
            .surfaces
            .get_mut(&outcome.node)
            .ok_or(InsertError::Detached)?;
        entry.value = outcome.new_value.clone();
        entry.selection = Some(Selection {
            start: outcome.caret,
            end: outcome.caret,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagelens_types::host::SurfaceKind;

    #[test]
    fn focus_then_detach_roundtrip() {
        let page = InMemoryHostPage::new();
        let node = NodeHandle::new("n1");
        page.report_focus(EditableSurface {
            node: node.clone(),
            kind: SurfaceKind::TextInput,
            value: "v".to_string(),
            selection: None,
        });
        assert!(page.contains(&node));

        page.report_detached(&node);
        assert!(!page.contains(&node));
        assert!(page.surface(&node).is_none());
    }

    #[test]
    fn apply_updates_value_and_caret() {
        let page = InMemoryHostPage::new();
        let node = NodeHandle::new("n1");
        page.report_focus(EditableSurface {
            node: node.clone(),
            kind: SurfaceKind::TextInput,
            value: "old".to_string(),
            selection: None,
        });

        page.apply(&InsertOutcome {
            node: node.clone(),
            new_value: "new text".to_string(),
            caret: 3,
            fires_input_event: true,
        })
        .unwrap();

        let surface = page.surface(&node).unwrap();
        assert_eq!(surface.value, "new text");
        assert_eq!(surface.selection, Some(Selection { start: 3, end: 3 }));
    }
}
