//! Streaming renderer: applies chunk sequences to a turn, in order.
//!
//! Each fragment is appended to the turn's content, the HTML is recomputed
//! from scratch (the formatter is pure), and the sink is notified so the
//! UI can repaint and scroll. Fragments are applied strictly in arrival
//! order -- no reordering, no batching.

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use pagelens_types::chat::ConversationTurn;
use pagelens_types::error::ChatError;

use crate::capability::ChunkStream;
use crate::markdown;

/// Where turn updates go. The UI event bus implements this.
pub trait RenderSink: Send + Sync {
    /// The turn's content/HTML/status changed.
    fn turn_updated(&self, turn: &ConversationTurn);

    /// New content arrived; keep the latest output visible.
    fn scroll_to_bottom(&self);
}

/// Consume a chunk stream into `turn`.
///
/// On normal completion the turn is frozen and copy/insert actions become
/// available. A mid-stream error marks the turn failed but preserves the
/// partial content already rendered. When `cancel` fires, remaining
/// fragments are drained and discarded without rendering -- the underlying
/// capability call is not guaranteed cancellable and may keep running.
pub async fn render_incremental<S: RenderSink>(
    turn: &mut ConversationTurn,
    mut chunks: ChunkStream,
    sink: &S,
    cancel: &CancellationToken,
) -> Result<(), ChatError> {
    while let Some(item) = chunks.next().await {
        if cancel.is_cancelled() {
            while chunks.next().await.is_some() {}
            turn.freeze();
            sink.turn_updated(turn);
            return Ok(());
        }

        match item {
            Ok(chunk) => {
                turn.append_chunk(&chunk);
                turn.rendered_html = markdown::format(&turn.content);
                sink.turn_updated(turn);
                sink.scroll_to_bottom();
            }
            Err(err) => {
                turn.mark_failed();
                sink.turn_updated(turn);
                return Err(ChatError::Streaming(err.to_string()));
            }
        }
    }

    turn.freeze();
    turn.rendered_html = markdown::format(&turn.content);
    sink.turn_updated(turn);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagelens_types::capability::CapabilityError;
    use pagelens_types::chat::TurnStatus;
    use std::sync::Mutex;

    /// Records every content state the sink observed.
    #[derive(Default)]
    struct RecordingSink {
        states: Mutex<Vec<String>>,
        scrolls: Mutex<usize>,
    }

    impl RenderSink for RecordingSink {
        fn turn_updated(&self, turn: &ConversationTurn) {
            self.states.lock().unwrap().push(turn.content.clone());
        }

        fn scroll_to_bottom(&self) {
            *self.scrolls.lock().unwrap() += 1;
        }
    }

    fn chunk_stream(chunks: Vec<Result<String, CapabilityError>>) -> ChunkStream {
        Box::pin(futures_util::stream::iter(chunks))
    }

    #[tokio::test]
    async fn chunks_apply_in_arrival_order() {
        let mut turn = ConversationTurn::assistant_streaming();
        let sink = RecordingSink::default();
        let cancel = CancellationToken::new();

        render_incremental(
            &mut turn,
            chunk_stream(vec![Ok("He".to_string()), Ok("llo".to_string())]),
            &sink,
            &cancel,
        )
        .await
        .unwrap();

        assert_eq!(turn.content, "Hello");
        assert_eq!(turn.status, TurnStatus::Complete);

        // Intermediate states are prefixes, never out of order.
        let states = sink.states.lock().unwrap();
        assert_eq!(&states[0], "He");
        assert_eq!(&states[1], "Hello");
        assert_eq!(*sink.scrolls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn markdown_rerendered_per_chunk() {
        let mut turn = ConversationTurn::assistant_streaming();
        let sink = RecordingSink::default();
        let cancel = CancellationToken::new();

        render_incremental(
            &mut turn,
            chunk_stream(vec![
                Ok("- Point A".to_string()),
                Ok("\n- Point B".to_string()),
            ]),
            &sink,
            &cancel,
        )
        .await
        .unwrap();

        assert_eq!(turn.content, "- Point A\n- Point B");
        assert_eq!(turn.rendered_html.matches("<li>").count(), 2);
    }

    #[tokio::test]
    async fn mid_stream_error_preserves_partial_content() {
        let mut turn = ConversationTurn::assistant_streaming();
        let sink = RecordingSink::default();
        let cancel = CancellationToken::new();

        let err = render_incremental(
            &mut turn,
            chunk_stream(vec![
                Ok("partial ".to_string()),
                Err(CapabilityError::Stream("connection lost".to_string())),
                Ok("never rendered".to_string()),
            ]),
            &sink,
            &cancel,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ChatError::Streaming(_)));
        assert_eq!(turn.status, TurnStatus::Failed);
        assert_eq!(turn.content, "partial ");
    }

    #[tokio::test]
    async fn cancellation_drains_without_rendering() {
        let mut turn = ConversationTurn::assistant_streaming();
        let sink = RecordingSink::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        render_incremental(
            &mut turn,
            chunk_stream(vec![Ok("a".to_string()), Ok("b".to_string())]),
            &sink,
            &cancel,
        )
        .await
        .unwrap();

        // Nothing rendered, but the stream was fully consumed.
        assert_eq!(turn.content, "");
        assert_eq!(*sink.scrolls.lock().unwrap(), 0);
    }
}
