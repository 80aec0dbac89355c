//! WebSocket handler: commands in, UI events out.
//!
//! The `/ws/chat` endpoint upgrades an HTTP connection to a WebSocket.
//! Once connected, the handler:
//!
//! - **Forwards events:** Subscribes to the [`EventBus`] on [`AppState`]
//!   and pushes every [`UiEvent`] to the client as a JSON text frame.
//! - **Receives commands:** Parses incoming text frames as [`WsCommand`]
//!   and drives the chat manager. Unknown or malformed messages are
//!   logged and ignored.
//!
//! Generation commands run on spawned tasks so event forwarding keeps
//! pace with the stream instead of buffering behind the dispatch.
//! Disconnecting does not cancel in-flight generation; the turn history
//! survives for the client to re-sync via `GET /api/turns`.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use uuid::Uuid;

use pagelens_core::chat::PreparedGeneration;
use pagelens_types::capability::LanguageTag;
use pagelens_types::host::{EditableSurface, HostFocusRecord, NodeHandle};
use pagelens_types::task::TaskKind;

use crate::state::AppState;

/// Incoming command from the extension client.
#[derive(Debug, serde::Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
enum WsCommand {
    /// Context-menu action against selected text.
    ProcessText { text: String, task: TaskKind },
    /// Chat-input submission.
    Chat { message: String },
    /// Target-language choice for a paused translate task.
    TranslateTo { target: String },
    /// Tear down sessions and clear the conversation.
    Reset,
    /// Force a fresh page-context snapshot.
    RefreshContext,
    /// Toggle page-grounded chat.
    SetContextMode { enabled: bool },
    /// The client moved to a new document.
    Navigate { url: String },
    /// An editable element gained focus.
    Focus {
        surface: EditableSurface,
        cursor_start: usize,
        cursor_end: usize,
    },
    /// An editable element left the document.
    Blur { node: NodeHandle },
    /// Copy a completed turn to the clipboard.
    CopyTurn { turn_id: Uuid },
    /// Insert a completed turn at the recorded caret.
    InsertTurn { turn_id: Uuid },
    /// Keep-alive ping. Server responds with `{"type":"pong"}`.
    Ping,
}

/// Upgrade an HTTP request to the chat WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// Core WebSocket connection handler.
///
/// Uses `tokio::select!` to multiplex between event-bus forwarding and
/// incoming client commands in a single task, so direct replies (pong,
/// insert outcomes) share the sender with broadcast events.
async fn handle_ws_connection(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let mut event_rx = state.bus.subscribe();

    loop {
        tokio::select! {
            // --- Branch 1: Forward UI events to the client ---
            event_result = event_rx.recv() => {
                match event_result {
                    Ok(event) => {
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                                    // Client disconnected
                                    break;
                                }
                            }
                            Err(err) => {
                                tracing::warn!("failed to serialize UiEvent: {err}");
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "WebSocket subscriber lagged, skipping {n} events");
                        // The client misses some repaints but catches up
                        // with the next turn update.
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }

            // --- Branch 2: Process client commands ---
            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        process_command(&text, &mut ws_sender, &state).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Err(err)) => {
                        tracing::debug!("WebSocket receive error: {err}");
                        break;
                    }
                    // Ignore binary, ping, pong protocol frames
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!("WebSocket connection closed");
}

/// Parse and process a single command from the client.
///
/// Generation runs detached: errors are already rendered inline as system
/// turns by the manager, so the spawned task only logs them.
async fn process_command(
    text: &str,
    ws_sender: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
    state: &AppState,
) {
    let cmd: WsCommand = match serde_json::from_str(text) {
        Ok(cmd) => cmd,
        Err(err) => {
            tracing::warn!(raw = %text, error = %err, "ignoring malformed WebSocket command");
            return;
        }
    };

    match cmd {
        WsCommand::ProcessText { text, task } => {
            spawn_generation(state, move |state| async move {
                state.manager.lock().await.begin_dispatch(task, text).await
            });
        }
        WsCommand::Chat { message } => {
            spawn_generation(state, move |state| async move {
                state.manager.lock().await.begin_chat_message(message).await
            });
        }
        WsCommand::TranslateTo { target } => match LanguageTag::new(target) {
            Ok(target) => {
                spawn_generation(state, move |state| async move {
                    state.manager.lock().await.begin_translate_to(target).await
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "translateTo: rejected target language");
                state.manager.lock().await.system_notice(
                    "That language code was not understood. Pick a language like 'fr' or 'pt-BR'.",
                );
            }
        },
        WsCommand::Reset => {
            state.manager.lock().await.reset().await;
        }
        WsCommand::RefreshContext => {
            state.manager.lock().await.refresh_context().await;
        }
        WsCommand::SetContextMode { enabled } => {
            state.manager.lock().await.set_context_mode(enabled);
        }
        WsCommand::Navigate { url } => {
            state.manager.lock().await.navigate(url).await;
        }
        WsCommand::Focus {
            surface,
            cursor_start,
            cursor_end,
        } => {
            let mut manager = state.manager.lock().await;
            let record = HostFocusRecord {
                node: surface.node.clone(),
                cursor_start,
                cursor_end,
            };
            manager.host().report_focus(surface);
            manager.record_focus(record);
        }
        WsCommand::Blur { node } => {
            state.manager.lock().await.host().report_detached(&node);
        }
        WsCommand::CopyTurn { turn_id } => {
            // Failures are already rendered inline as system turns.
            if let Err(err) = state.manager.lock().await.copy_turn(turn_id) {
                tracing::debug!(%turn_id, error = %err, "copy failed");
            }
        }
        WsCommand::InsertTurn { turn_id } => {
            let outcome = state.manager.lock().await.insert_turn(turn_id);
            match outcome {
                Ok(outcome) => {
                    let reply = serde_json::json!({
                        "type": "insert_outcome",
                        "outcome": outcome,
                    });
                    if let Ok(json) = serde_json::to_string(&reply) {
                        let _ = ws_sender.send(Message::Text(json.into())).await;
                    }
                }
                Err(err) => {
                    tracing::debug!(%turn_id, error = %err, "insert failed");
                }
            }
        }
        WsCommand::Ping => {
            let pong = r#"{"type":"pong"}"#;
            if ws_sender.send(Message::Text(pong.into())).await.is_err() {
                tracing::debug!("failed to send pong (client disconnecting)");
            }
        }
    }
}

/// Run a generation command on its own task.
///
/// `begin` holds the manager lock only long enough to resolve the session
/// and open the turn; the stream is consumed without the lock, so reset
/// and quick commands stay responsive mid-generation, and a reset can
/// cancel the rendering it no longer wants.
fn spawn_generation<F, Fut>(state: &AppState, begin: F)
where
    F: FnOnce(AppState) -> Fut + Send + 'static,
    Fut: std::future::Future<
            Output = Result<Option<PreparedGeneration>, pagelens_types::error::ChatError>,
        > + Send
        + 'static,
{
    let state = state.clone();
    tokio::spawn(async move {
        let prepared = match begin(state.clone()).await {
            Ok(prepared) => prepared,
            Err(err) => {
                // Already surfaced inline as a system turn.
                tracing::debug!(error = %err, "generation command failed");
                return;
            }
        };
        if let Some(prepared) = prepared {
            let finished = prepared.run().await;
            if let Err(err) = state.manager.lock().await.finish_generation(finished) {
                tracing::debug!(error = %err, "generation failed mid-stream");
            }
        }
    });
}
