//! Status and turn-history endpoints.

use axum::extract::State;
use axum::Json;

use pagelens_core::capability::ProbeReport;
use pagelens_types::chat::ConversationTurn;

use crate::state::AppState;

#[derive(serde::Serialize)]
pub struct StatusResponse {
    /// Per-capability usability from a fresh probe.
    pub capabilities: ProbeReport,
    pub context_mode: bool,
    pub turn_count: usize,
}

/// GET /api/status - capability availability and session summary.
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let manager = state.manager.lock().await;
    let capabilities = manager.probe_capabilities().await;

    Json(StatusResponse {
        capabilities,
        context_mode: manager.context_mode(),
        turn_count: manager.turns().len(),
    })
}

/// GET /api/turns - the full conversation, for client reconnects.
pub async fn get_turns(State(state): State<AppState>) -> Json<Vec<ConversationTurn>> {
    let manager = state.manager.lock().await;
    Json(manager.turns().to_vec())
}
