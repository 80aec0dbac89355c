//! Capability factory backed by a local OpenAI-compatible model runtime.
//!
//! One [`LocalRuntimeFactory`] serves all five capability kinds from a
//! single endpoint (Ollama-style, `http://localhost:11434/v1` by default):
//! each created capability is the configured model plus a system prompt
//! derived from the session configuration.
//!
//! Uses [`async_openai`] for type-safe request/response handling and
//! built-in SSE streaming.

pub mod prompts;
pub mod streaming;

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use async_openai::Client;

use tracing::Instrument;

use pagelens_core::capability::{
    BoxCapability, Capability, CapabilityFactory, ChunkStream, ProgressCallback,
};
use pagelens_observe::genai_attrs::{
    OP_DETECT_LANGUAGE, OP_REPHRASE, OP_SUMMARIZE, OP_TRANSLATE, OP_WRITE, PROVIDER_LOCAL_RUNTIME,
};
use pagelens_types::capability::{
    Availability, CapabilityConfig, CapabilityError, CapabilityKind, GenerationRequest,
};
use pagelens_types::config::{ModelMap, RuntimeConfig};

use self::prompts::system_prompt_for;
use self::streaming::map_chunk_stream;

/// Factory creating capabilities against the local runtime.
///
/// Does NOT derive Debug to avoid dumping the `async_openai::Client`
/// internals into logs.
pub struct LocalRuntimeFactory {
    client: Client<OpenAIConfig>,
    models: ModelMap,
}

impl LocalRuntimeFactory {
    pub fn new(config: &RuntimeConfig) -> Self {
        let openai_config = OpenAIConfig::new().with_api_base(&config.base_url);
        Self {
            client: Client::with_config(openai_config),
            models: config.models.clone(),
        }
    }
}

impl CapabilityFactory for LocalRuntimeFactory {
    /// Probe the runtime's model list.
    ///
    /// The runtime being unreachable is an error (the prober demotes it).
    /// A reachable runtime without the configured model is usable after a
    /// download, which the runtime performs on first use.
    async fn availability(&self, kind: CapabilityKind) -> Result<Availability, CapabilityError> {
        let listing = self
            .client
            .models()
            .list()
            .await
            .map_err(|e| CapabilityError::Request(e.to_string()))?;

        let wanted = self.models.for_kind(kind);
        let present = listing.data.iter().any(|m| matches_model(&m.id, wanted));
        Ok(if present {
            Availability::Available
        } else {
            Availability::AfterDownload
        })
    }

    async fn create(
        &self,
        config: CapabilityConfig,
        progress: Option<ProgressCallback>,
    ) -> Result<BoxCapability, CapabilityError> {
        let kind = config.kind();
        // The runtime pulls a missing model on first request; we cannot see
        // inside that download, so progress is reported coarsely.
        if let Some(ref report) = progress {
            report(0);
        }

        let availability = self.availability(kind).await.map_err(|e| {
            CapabilityError::Creation {
                kind,
                message: e.to_string(),
            }
        })?;
        if availability == Availability::AfterDownload {
            tracing::info!(
                capability = %kind,
                model = self.models.for_kind(kind),
                "model not present; runtime will download on first request"
            );
        }

        if let Some(ref report) = progress {
            report(100);
        }

        Ok(BoxCapability::new(LocalCapability {
            client: self.client.clone(),
            kind,
            model: self.models.for_kind(kind).to_string(),
            system_prompt: system_prompt_for(&config),
        }))
    }
}

/// One capability: a model plus the system prompt fixed at creation.
pub struct LocalCapability {
    client: Client<OpenAIConfig>,
    kind: CapabilityKind,
    model: String,
    system_prompt: String,
}

impl LocalCapability {
    fn build_request(&self, request: &GenerationRequest, stream: bool) -> CreateChatCompletionRequest {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(
                    self.system_prompt.clone(),
                ),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(request.full_prompt()),
                name: None,
            }),
        ];

        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            stream: if stream { Some(true) } else { None },
            ..Default::default()
        }
    }
}

impl Capability for LocalCapability {
    fn kind(&self) -> CapabilityKind {
        self.kind
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, CapabilityError> {
        let span = tracing::info_span!(
            "capability_generate",
            gen_ai.operation.name = operation_name(self.kind),
            gen_ai.provider.name = PROVIDER_LOCAL_RUNTIME,
            gen_ai.request.model = %self.model,
        );
        let response = self
            .client
            .chat()
            .create(self.build_request(request, false))
            .instrument(span)
            .await
            .map_err(|e| CapabilityError::Request(e.to_string()))?;

        Ok(response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default())
    }

    fn stream(&self, request: GenerationRequest) -> ChunkStream {
        tracing::debug!(
            gen_ai.operation.name = operation_name(self.kind),
            gen_ai.provider.name = PROVIDER_LOCAL_RUNTIME,
            gen_ai.request.model = %self.model,
            "starting capability stream"
        );
        let oai_request = self.build_request(&request, true);
        let client = self.client.clone();

        Box::pin(async_stream::try_stream! {
            let oai_stream = client
                .chat()
                .create_stream(oai_request)
                .await
                .map_err(|e| CapabilityError::Stream(e.to_string()))?;

            let mut inner = map_chunk_stream(oai_stream);

            use futures_util::StreamExt;
            while let Some(chunk) = inner.next().await {
                match chunk {
                    Ok(text) => yield text,
                    Err(e) => Err(e)?,
                }
            }
        })
    }
}

/// GenAI span operation name for a capability kind.
fn operation_name(kind: CapabilityKind) -> &'static str {
    match kind {
        CapabilityKind::Writer => OP_WRITE,
        CapabilityKind::Rewriter => OP_REPHRASE,
        CapabilityKind::Summarizer => OP_SUMMARIZE,
        CapabilityKind::Translator => OP_TRANSLATE,
        CapabilityKind::LanguageDetector => OP_DETECT_LANGUAGE,
    }
}

/// Whether a listed model id serves the configured name.
///
/// Ollama lists tagged ids ("gemma3n:latest"); a bare configured name
/// matches any tag of itself.
fn matches_model(listed: &str, wanted: &str) -> bool {
    listed == wanted || listed.strip_prefix(wanted).is_some_and(|rest| rest.starts_with(':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capability(kind: CapabilityKind, config: CapabilityConfig) -> LocalCapability {
        LocalCapability {
            client: Client::with_config(OpenAIConfig::new().with_api_base("http://localhost:1/v1")),
            kind,
            model: "gemma3n".to_string(),
            system_prompt: system_prompt_for(&config),
        }
    }

    #[test]
    fn test_matches_model_tags() {
        assert!(matches_model("gemma3n", "gemma3n"));
        assert!(matches_model("gemma3n:latest", "gemma3n"));
        assert!(matches_model("gemma3n:e4b", "gemma3n"));
        assert!(!matches_model("gemma3", "gemma3n"));
        assert!(!matches_model("gemma3n-instruct", "gemma3n"));
    }

    #[test]
    fn test_build_request_system_then_user() {
        let cap = capability(CapabilityKind::Writer, CapabilityConfig::writer_default());
        let request = GenerationRequest::with_context("write a reply", "Page text here");
        let req = cap.build_request(&request, false);

        assert_eq!(req.model, "gemma3n");
        assert_eq!(req.messages.len(), 2);
        assert!(matches!(
            req.messages[0],
            ChatCompletionRequestMessage::System(_)
        ));
        // The user message carries context before prompt.
        match &req.messages[1] {
            ChatCompletionRequestMessage::User(user) => match &user.content {
                ChatCompletionRequestUserMessageContent::Text(text) => {
                    assert_eq!(text, "Page text here\n\nwrite a reply");
                }
                other => panic!("unexpected content: {other:?}"),
            },
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(req.stream.is_none());
    }

    #[test]
    fn test_build_request_streaming_flag() {
        let cap = capability(CapabilityKind::Summarizer, CapabilityConfig::writer_default());
        let req = cap.build_request(&GenerationRequest::new("hi"), true);
        assert_eq!(req.stream, Some(true));
    }
}
