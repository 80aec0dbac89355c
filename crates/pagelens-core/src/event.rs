//! UI event bus.
//!
//! The chat manager publishes [`UiEvent`]s; the WebSocket handler (and any
//! other subscriber) forwards them to clients. Backed by a tokio broadcast
//! channel -- publishing never blocks, and events published with no
//! subscriber connected are simply dropped.

use tokio::sync::broadcast;

use pagelens_types::capability::CapabilityKind;
use pagelens_types::chat::ConversationTurn;

use crate::chat::renderer::RenderSink;

/// Default buffered event capacity per subscriber.
const EVENT_CAPACITY: usize = 256;

/// Events pushed to the UI.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// A new turn was appended to the conversation.
    TurnStarted { turn: ConversationTurn },
    /// A turn's content, HTML, or status changed.
    TurnUpdated { turn: ConversationTurn },
    /// Keep the newest output visible.
    ScrollToBottom,
    /// A custom task is pending; the next chat message supplies the
    /// instruction.
    AwaitingCustomInstruction { selected_text: String },
    /// Translate needs a target language before it can run.
    AwaitingLanguage { selected_text: String },
    /// Model download progress for a capability being created.
    DownloadProgress { kind: CapabilityKind, percent: u8 },
    /// The page-context snapshot was refreshed.
    ContextRefreshed { version: u64, word_count: usize },
    /// Page-context mode was toggled.
    ContextModeChanged { enabled: bool },
    /// The chat was reset: sessions destroyed, turns cleared.
    ChatReset,
}

/// Broadcast bus for [`UiEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<UiEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: UiEvent) {
        // A send error only means nobody is listening right now.
        let _ = self.tx.send(event);
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for EventBus {
    fn turn_updated(&self, turn: &ConversationTurn) {
        self.publish(UiEvent::TurnUpdated { turn: turn.clone() });
    }

    fn scroll_to_bottom(&self) {
        self.publish(UiEvent::ScrollToBottom);
    }
}
