//! Runtime SSE stream to text-chunk adapter.
//!
//! Maps `async-openai`'s [`ChatCompletionResponseStream`] to the plain
//! text-fragment stream the core renderer consumes. Only content deltas
//! survive the mapping; role/usage/finish bookkeeping chunks are dropped.

use async_openai::types::chat::ChatCompletionResponseStream;
use futures_util::StreamExt;

use pagelens_core::capability::ChunkStream;
use pagelens_types::capability::CapabilityError;

/// Map a chat completion stream to bare text fragments.
pub fn map_chunk_stream(stream: ChatCompletionResponseStream) -> ChunkStream {
    Box::pin(async_stream::try_stream! {
        let mut stream = stream;
        while let Some(result) = stream.next().await {
            let chunk = result.map_err(|e| CapabilityError::Stream(e.to_string()))?;
            for choice in &chunk.choices {
                if let Some(text) = &choice.delta.content {
                    if !text.is_empty() {
                        yield text.clone();
                    }
                }
            }
        }
    })
}
