//! Task dispatch: one exhaustive switch from task kind to capability call.
//!
//! Every dispatch starts with an availability sweep; if nothing is usable
//! the fixed unavailability notice is rendered and no session is touched.
//! Two task kinds pause instead of streaming: `custom` waits for the next
//! chat message to supply the instruction, and `translate` without a
//! target waits for a language choice. Both resume through dedicated
//! entry points below.
//!
//! Dispatch is split into two phases so callers sharing the manager behind
//! a mutex stay responsive mid-generation. A `begin_*` call needs the
//! manager: it probes, resolves the session, and opens the assistant turn,
//! handing back a [`PreparedGeneration`]. `PreparedGeneration::run` owns
//! everything it touches, so the manager lock can be released while chunks
//! stream in; the finished turn is filed back with
//! [`ChatSessionManager::finish_generation`] under a short re-lock. The
//! `dispatch` / `send_chat_message` / `translate_to` wrappers do all three
//! steps for callers that hold the manager exclusively anyway.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use pagelens_types::capability::{CapabilityConfig, GenerationRequest, LanguageTag};
use pagelens_types::chat::{ConversationTurn, PendingCustomTask};
use pagelens_types::error::ChatError;
use pagelens_types::task::TaskKind;

use crate::capability::{CapabilitySession, ChunkStream, ProgressCallback};
use crate::chat::manager::{ChatSessionManager, UNAVAILABLE_MESSAGE};
use crate::chat::renderer::render_incremental;
use crate::context::PageSource;
use crate::event::{EventBus, UiEvent};
use crate::host::{Clipboard, HostPage};

/// A resolved generation whose assistant turn is already open.
///
/// Holds only owned handles (chunk stream, bus clone, cancellation token
/// clone), so running it needs no further manager access.
pub struct PreparedGeneration {
    turn: ConversationTurn,
    stream: ChunkStream,
    bus: EventBus,
    cancel: CancellationToken,
}

impl PreparedGeneration {
    /// Consume the chunk stream into the opened turn.
    pub async fn run(self) -> FinishedGeneration {
        let PreparedGeneration {
            mut turn,
            stream,
            bus,
            cancel,
        } = self;
        let result = render_incremental(&mut turn, stream, &bus, &cancel).await;
        FinishedGeneration {
            cancelled: cancel.is_cancelled(),
            turn,
            result,
        }
    }
}

/// A fully streamed turn waiting to be filed back into the history.
pub struct FinishedGeneration {
    turn: ConversationTurn,
    cancelled: bool,
    result: Result<(), ChatError>,
}

impl<P, C, H> ChatSessionManager<P, C, H>
where
    P: PageSource,
    C: Clipboard,
    H: HostPage,
{
    /// Dispatch a context-menu task and stream it to completion.
    pub async fn dispatch(
        &mut self,
        task: TaskKind,
        selected_text: String,
    ) -> Result<(), ChatError> {
        let begun = self.begin_dispatch(task, selected_text).await?;
        self.complete(begun).await
    }

    /// Handle a chat-input submission, streaming to completion.
    pub async fn send_chat_message(&mut self, message: String) -> Result<(), ChatError> {
        let begun = self.begin_chat_message(message).await?;
        self.complete(begun).await
    }

    /// Resume a paused translate task, streaming to completion.
    pub async fn translate_to(&mut self, target: LanguageTag) -> Result<(), ChatError> {
        let begun = self.begin_translate_to(target).await?;
        self.complete(begun).await
    }

    /// Begin a context-menu task against the selected text.
    ///
    /// `Ok(None)` means the task paused instead of streaming: a custom
    /// task waits for its instruction, a targetless translate waits for a
    /// language choice.
    pub async fn begin_dispatch(
        &mut self,
        task: TaskKind,
        selected_text: String,
    ) -> Result<Option<PreparedGeneration>, ChatError> {
        if !self.probe_capabilities().await.any_available() {
            self.system_notice(UNAVAILABLE_MESSAGE);
            return Err(ChatError::CapabilityUnavailable);
        }
        tracing::info!(task = %task, chars = selected_text.len(), "dispatching task");

        match task {
            TaskKind::Custom => {
                // Resolve the writer before pausing, so a model download
                // runs while the instruction is being typed.
                self.resolve_session(CapabilityConfig::writer_default())
                    .await?;
                // Replacing an earlier pending task: the newest selection
                // wins, and exactly one is ever outstanding.
                self.pending_custom = Some(PendingCustomTask::new(selected_text.clone()));
                self.bus()
                    .publish(UiEvent::AwaitingCustomInstruction { selected_text });
                Ok(None)
            }
            TaskKind::Translate { target: None } => {
                self.pending_translation = Some(selected_text.clone());
                self.bus()
                    .publish(UiEvent::AwaitingLanguage { selected_text });
                Ok(None)
            }
            TaskKind::Translate {
                target: Some(target),
            } => self
                .prepare_translation(selected_text, target)
                .await
                .map(Some),
            TaskKind::Rephrase { tone } => {
                self.push_turn(ConversationTurn::user(selected_text.clone()));
                self.prepare_capability_turn(
                    CapabilityConfig::rewriter(tone),
                    GenerationRequest::new(selected_text),
                )
                .await
                .map(Some)
            }
            TaskKind::Summarize { style } => {
                self.push_turn(ConversationTurn::user(selected_text.clone()));
                self.prepare_capability_turn(
                    CapabilityConfig::summarizer(style),
                    GenerationRequest::new(selected_text),
                )
                .await
                .map(Some)
            }
            TaskKind::Write => {
                self.push_turn(ConversationTurn::user(selected_text.clone()));
                self.prepare_capability_turn(
                    CapabilityConfig::writer_default(),
                    GenerationRequest::new(selected_text),
                )
                .await
                .map(Some)
            }
            TaskKind::Preset { preset } => {
                self.push_turn(ConversationTurn::user(selected_text.clone()));
                let prompt = format!("{} {selected_text}", preset.instruction());
                self.prepare_capability_turn(
                    CapabilityConfig::writer_default(),
                    GenerationRequest::new(prompt),
                )
                .await
                .map(Some)
            }
        }
    }

    /// Begin handling a chat-input submission.
    ///
    /// Consumes a pending custom task if one exists (the message is the
    /// instruction, merged ahead of the stored selection). Otherwise it is
    /// an ordinary writer request, augmented with the page-context
    /// preamble when context mode is on and the snapshot is substantial
    /// enough to be useful.
    pub async fn begin_chat_message(
        &mut self,
        message: String,
    ) -> Result<Option<PreparedGeneration>, ChatError> {
        if !self.probe_capabilities().await.any_available() {
            self.system_notice(UNAVAILABLE_MESSAGE);
            return Err(ChatError::CapabilityUnavailable);
        }

        self.push_turn(ConversationTurn::user(message.clone()));

        if let Some(pending) = self.pending_custom.take() {
            let prompt = pending.merged_prompt(&message);
            return self
                .prepare_capability_turn(
                    CapabilityConfig::writer_default(),
                    GenerationRequest::new(prompt),
                )
                .await
                .map(Some);
        }

        let min_words = self.config().context.min_words;
        let request = if self.context_mode() {
            match self.extractor().extract(false).await {
                Some(snapshot) if snapshot.is_useful(min_words) => {
                    GenerationRequest::with_context(message, snapshot.text)
                }
                _ => GenerationRequest::new(message),
            }
        } else {
            GenerationRequest::new(message)
        };

        self.prepare_capability_turn(CapabilityConfig::writer_default(), request)
            .await
            .map(Some)
    }

    /// Begin resuming a paused translate task with the chosen target.
    pub async fn begin_translate_to(
        &mut self,
        target: LanguageTag,
    ) -> Result<Option<PreparedGeneration>, ChatError> {
        let Some(text) = self.pending_translation.take() else {
            self.system_notice("Select text and choose Translate first.");
            return Ok(None);
        };
        self.prepare_translation(text, target).await.map(Some)
    }

    /// File a streamed turn back into the history.
    ///
    /// A generation cancelled by [`ChatSessionManager::reset`] is
    /// discarded: the reset already cleared the history it belonged to.
    pub fn finish_generation(&mut self, finished: FinishedGeneration) -> Result<(), ChatError> {
        if finished.cancelled {
            return finished.result;
        }
        self.store_turn(finished.turn);
        finished.result
    }

    async fn complete(&mut self, begun: Option<PreparedGeneration>) -> Result<(), ChatError> {
        match begun {
            Some(prepared) => {
                let finished = prepared.run().await;
                self.finish_generation(finished)
            }
            None => Ok(()),
        }
    }

    async fn prepare_translation(
        &mut self,
        text: String,
        target: LanguageTag,
    ) -> Result<PreparedGeneration, ChatError> {
        let source = self.detect_language(&text).await;
        tracing::debug!(%source, %target, "translating");

        self.push_turn(ConversationTurn::user(text.clone()));
        self.prepare_capability_turn(
            CapabilityConfig::Translator { source, target },
            GenerationRequest::new(text),
        )
        .await
    }

    /// Best-effort source-language detection.
    ///
    /// Any failure (detector unavailable, unparseable answer) falls back
    /// to the configured default source language.
    async fn detect_language(&self, text: &str) -> LanguageTag {
        let detected = match self
            .registry()
            .get_or_create(CapabilityConfig::LanguageDetector, None)
            .await
        {
            Ok(session) => session.generate(&GenerationRequest::new(text)).await,
            Err(err) => Err(err),
        };

        match detected {
            Ok(raw) => {
                let token = raw.split_whitespace().next().unwrap_or_default();
                match LanguageTag::new(token) {
                    Ok(tag) => return tag,
                    Err(err) => {
                        tracing::warn!(error = %err, "detector returned an unusable tag")
                    }
                }
            }
            Err(err) => tracing::warn!(error = %err, "language detection failed"),
        }

        LanguageTag::new(self.config().chat.default_source_language.clone()).unwrap_or_default()
    }

    /// Resolve the session for `config`, reporting download progress.
    ///
    /// Creation failures render inline and leave the registry untouched,
    /// so the next dispatch retries creation.
    async fn resolve_session(
        &mut self,
        config: CapabilityConfig,
    ) -> Result<Arc<CapabilitySession>, ChatError> {
        let kind = config.kind();
        let bus = self.bus().clone();
        let progress: ProgressCallback = Box::new(move |percent| {
            bus.publish(UiEvent::DownloadProgress { kind, percent });
        });

        match self.registry().get_or_create(config, Some(progress)).await {
            Ok(session) => Ok(session),
            Err(err) => {
                let chat_err = ChatError::SessionCreation {
                    kind,
                    message: err.to_string(),
                };
                self.system_notice(&chat_err.to_string());
                Err(chat_err)
            }
        }
    }

    /// Resolve a session and open an assistant turn over its stream.
    async fn prepare_capability_turn(
        &mut self,
        config: CapabilityConfig,
        request: GenerationRequest,
    ) -> Result<PreparedGeneration, ChatError> {
        let session = self.resolve_session(config).await?;

        let turn = ConversationTurn::assistant_streaming();
        self.bus()
            .publish(UiEvent::TurnStarted { turn: turn.clone() });

        Ok(PreparedGeneration {
            stream: session.stream(request),
            turn,
            bus: self.bus().clone(),
            cancel: self.cancel.clone(),
        })
    }
}
