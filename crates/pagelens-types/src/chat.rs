//! Conversation turns and the pending-custom-task bridge.
//!
//! A turn's `content` accumulates while its stream is live and is frozen
//! once the stream completes; `rendered_html` is derived from `content` by
//! the markdown formatter and recomputed on every chunk arrival.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::task::TaskKind;

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
    System,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
            TurnRole::System => write!(f, "system"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            "system" => Ok(TurnRole::System),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

/// Lifecycle status of a turn.
///
/// `Failed` turns keep whatever content streamed in before the failure;
/// partial output is preserved, not discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    Streaming,
    Complete,
    Failed,
}

/// One exchange in the chat.
///
/// Mutated only by the streaming consumer that owns it; once `freeze` or
/// `mark_failed` has run, the turn is immutable. A "regenerate" creates a
/// new turn rather than reopening an old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub role: TurnRole,
    pub content: String,
    pub rendered_html: String,
    pub status: TurnStatus,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    /// A completed user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::finished(TurnRole::User, content)
    }

    /// A completed system/notice turn (error messages, guidance).
    pub fn system(content: impl Into<String>) -> Self {
        Self::finished(TurnRole::System, content)
    }

    /// An empty assistant turn ready to receive streamed chunks.
    pub fn assistant_streaming() -> Self {
        Self {
            id: Uuid::now_v7(),
            role: TurnRole::Assistant,
            content: String::new(),
            rendered_html: String::new(),
            status: TurnStatus::Streaming,
            created_at: Utc::now(),
        }
    }

    fn finished(role: TurnRole, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: Uuid::now_v7(),
            role,
            content,
            rendered_html: String::new(),
            status: TurnStatus::Complete,
            created_at: Utc::now(),
        }
    }

    /// Append a streamed chunk. No-op once the turn is frozen.
    pub fn append_chunk(&mut self, chunk: &str) {
        if self.status == TurnStatus::Streaming {
            self.content.push_str(chunk);
        }
    }

    /// Freeze the turn: the stream completed normally.
    pub fn freeze(&mut self) {
        if self.status == TurnStatus::Streaming {
            self.status = TurnStatus::Complete;
        }
    }

    /// Mark the turn failed, preserving any partial content.
    pub fn mark_failed(&mut self) {
        self.status = TurnStatus::Failed;
    }

    /// Whether copy/insert actions may target this turn.
    pub fn actions_enabled(&self) -> bool {
        self.status == TurnStatus::Complete && !self.content.is_empty()
    }
}

/// Transient state bridging a context-menu "custom" action to the next
/// chat input. At most one exists at a time; it is consumed by exactly the
/// next submitted chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingCustomTask {
    pub selected_text: String,
    pub task: TaskKind,
}

impl PendingCustomTask {
    pub fn new(selected_text: impl Into<String>) -> Self {
        Self {
            selected_text: selected_text.into(),
            task: TaskKind::Custom,
        }
    }

    /// Merge the user's follow-up instruction with the original selection,
    /// instruction first.
    pub fn merged_prompt(&self, instruction: &str) -> String {
        format!("{instruction} {}", self.selected_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_role_roundtrip() {
        for role in [TurnRole::User, TurnRole::Assistant, TurnRole::System] {
            let s = role.to_string();
            let parsed: TurnRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_append_then_freeze() {
        let mut turn = ConversationTurn::assistant_streaming();
        turn.append_chunk("He");
        turn.append_chunk("llo");
        assert_eq!(turn.content, "Hello");

        turn.freeze();
        assert_eq!(turn.status, TurnStatus::Complete);

        // Frozen turns ignore further chunks.
        turn.append_chunk(" world");
        assert_eq!(turn.content, "Hello");
    }

    #[test]
    fn test_failed_turn_preserves_partial_content() {
        let mut turn = ConversationTurn::assistant_streaming();
        turn.append_chunk("partial out");
        turn.mark_failed();
        assert_eq!(turn.status, TurnStatus::Failed);
        assert_eq!(turn.content, "partial out");
        assert!(!turn.actions_enabled());
    }

    #[test]
    fn test_actions_enabled_only_when_complete() {
        let mut turn = ConversationTurn::assistant_streaming();
        assert!(!turn.actions_enabled());
        turn.append_chunk("done");
        turn.freeze();
        assert!(turn.actions_enabled());
    }

    #[test]
    fn test_pending_custom_merge_order() {
        let pending = PendingCustomTask::new("Acme Corp raised $10M");
        assert_eq!(
            pending.merged_prompt("write a tweet about this"),
            "write a tweet about this Acme Corp raised $10M"
        );
    }
}
