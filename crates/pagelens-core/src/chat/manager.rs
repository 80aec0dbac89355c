//! The chat session manager.
//!
//! Owns all registry/context/focus state for one page-injection lifetime
//! and is passed by reference to event handlers -- there is no global
//! mutable module state. Generic over the collaborator seams so the api
//! crate pins them to infra implementations and tests pin them to fakes.
//!
//! All mutation happens sequentially: callers serialize access (the api
//! crate holds the manager behind an async mutex), and suspension occurs
//! only at capability-call boundaries.

use tokio_util::sync::CancellationToken;

use pagelens_types::chat::{ConversationTurn, PendingCustomTask};
use pagelens_types::config::AssistantConfig;
use pagelens_types::error::ChatError;
use pagelens_types::host::{HostFocusRecord, InsertOutcome};
use uuid::Uuid;

use crate::capability::{probe, BoxCapabilityFactory, ProbeReport, SessionRegistry};
use crate::context::{ContextExtractor, PageSource};
use crate::event::{EventBus, UiEvent};
use crate::host::{self, Clipboard, HostPage};

/// Fixed message rendered when no capability is usable.
pub const UNAVAILABLE_MESSAGE: &str = "AI capabilities are not available on this device. \
Make sure the on-device model runtime is installed and running, then try again.";

/// Page-context-aware chat session manager.
///
/// Constructed once per page-injection lifetime. `P` supplies the current
/// page, `C` the system clipboard, `H` the host-page surface model.
pub struct ChatSessionManager<P, C, H>
where
    P: PageSource,
    C: Clipboard,
    H: HostPage,
{
    registry: SessionRegistry,
    extractor: ContextExtractor<P>,
    clipboard: C,
    host: H,
    bus: EventBus,
    config: AssistantConfig,
    turns: Vec<ConversationTurn>,
    pub(crate) pending_custom: Option<PendingCustomTask>,
    /// Selected text waiting for a translate target-language choice.
    pub(crate) pending_translation: Option<String>,
    focus: Option<HostFocusRecord>,
    context_mode: bool,
    pub(crate) cancel: CancellationToken,
}

impl<P, C, H> ChatSessionManager<P, C, H>
where
    P: PageSource,
    C: Clipboard,
    H: HostPage,
{
    pub fn new(
        factory: BoxCapabilityFactory,
        source: P,
        clipboard: C,
        host: H,
        config: AssistantConfig,
    ) -> Self {
        let extractor = ContextExtractor::new(source, config.context.max_words);
        let context_mode = config.chat.page_context_enabled;
        Self {
            registry: SessionRegistry::new(factory),
            extractor,
            clipboard,
            host,
            bus: EventBus::new(),
            config,
            turns: Vec::new(),
            pending_custom: None,
            pending_translation: None,
            focus: None,
            context_mode,
            cancel: CancellationToken::new(),
        }
    }

    // --- Accessors ---

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn context_mode(&self) -> bool {
        self.context_mode
    }

    pub fn pending_custom(&self) -> Option<&PendingCustomTask> {
        self.pending_custom.as_ref()
    }

    pub(crate) fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub(crate) fn extractor(&self) -> &ContextExtractor<P> {
        &self.extractor
    }

    pub(crate) fn config(&self) -> &AssistantConfig {
        &self.config
    }

    // --- Capability status ---

    /// Probe every capability; backs the status surface and gates dispatch.
    pub async fn probe_capabilities(&self) -> ProbeReport {
        probe(self.registry.factory()).await
    }

    // --- Page context ---

    /// Point the extractor at a new document and drop the stale snapshot.
    pub async fn navigate(&mut self, url: String) {
        tracing::info!(%url, "page navigation");
        self.extractor.source().navigate(url).await;
        self.extractor.invalidate().await;
    }

    /// Force a fresh context snapshot and announce the result.
    pub async fn refresh_context(&mut self) {
        match self.extractor.extract(true).await {
            Some(snapshot) => self.bus.publish(UiEvent::ContextRefreshed {
                version: snapshot.version,
                word_count: snapshot.word_count(),
            }),
            None => self.system_notice("Could not read the page content."),
        }
    }

    pub fn set_context_mode(&mut self, enabled: bool) {
        self.context_mode = enabled;
        self.bus.publish(UiEvent::ContextModeChanged { enabled });
    }

    // --- Focus tracking ---

    /// Record where generated text may later be inserted.
    pub fn record_focus(&mut self, record: HostFocusRecord) {
        self.focus = Some(record);
    }

    // --- Turn actions ---

    /// Copy a completed turn's content to the clipboard.
    pub fn copy_turn(&mut self, turn_id: Uuid) -> Result<(), ChatError> {
        let turn = self.completed_turn(turn_id)?;
        if let Err(err) = host::copy(&self.clipboard, &turn) {
            let chat_err = ChatError::from(err);
            self.system_notice(&chat_err.to_string());
            return Err(chat_err);
        }
        Ok(())
    }

    /// Insert a completed turn's content at the recorded caret position.
    ///
    /// Failures (nothing focused, element detached) surface as inline
    /// guidance messages; the user retries after refocusing.
    pub fn insert_turn(&mut self, turn_id: Uuid) -> Result<InsertOutcome, ChatError> {
        let turn = self.completed_turn(turn_id)?;
        match host::insert(&self.host, self.focus.as_ref(), &turn) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                let chat_err = ChatError::from(err);
                self.system_notice(&chat_err.to_string());
                Err(chat_err)
            }
        }
    }

    fn completed_turn(&mut self, turn_id: Uuid) -> Result<ConversationTurn, ChatError> {
        let Some(idx) = self.turns.iter().position(|t| t.id == turn_id) else {
            return Err(ChatError::UnknownTurn(turn_id));
        };
        if !self.turns[idx].actions_enabled() {
            self.system_notice(&ChatError::TurnNotReady.to_string());
            return Err(ChatError::TurnNotReady);
        }
        Ok(self.turns[idx].clone())
    }

    // --- Lifecycle ---

    /// Tear down every cached session and clear all conversational state.
    ///
    /// In-flight streams stop rendering (remaining fragments are drained
    /// and discarded); the underlying capability calls may keep running in
    /// the background.
    pub async fn reset(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.registry.reset().await;
        self.extractor.invalidate().await;
        self.turns.clear();
        self.pending_custom = None;
        self.pending_translation = None;
        self.bus.publish(UiEvent::ChatReset);
        tracing::info!("chat reset");
    }

    // --- Internal helpers shared with the dispatcher ---

    pub(crate) fn push_turn(&mut self, turn: ConversationTurn) {
        self.bus.publish(UiEvent::TurnStarted { turn: turn.clone() });
        self.turns.push(turn);
    }

    /// Store a turn that was already announced via `TurnStarted`.
    pub(crate) fn store_turn(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// Render an inline guidance/notice turn.
    pub fn system_notice(&mut self, message: &str) {
        self.push_turn(ConversationTurn::system(message));
    }
}
