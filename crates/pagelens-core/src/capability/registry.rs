//! Session registry: at most one live capability instance per kind.
//!
//! Sessions are created lazily on first use of a kind and reused for every
//! subsequent request of that kind -- configuration differences on a cached
//! instance are ignored (documented limitation: callers accept the
//! configuration fixed at first creation until a reset). `reset` closes
//! every cached session; handles issued before the reset refuse further
//! requests, and the next `get_or_create` builds a fresh instance.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use pagelens_types::capability::{
    CapabilityConfig, CapabilityError, CapabilityKind, GenerationRequest,
};

use super::boxed::{BoxCapability, BoxCapabilityFactory};
use super::runtime::{ChunkStream, ProgressCallback};

/// One live connection to an on-device capability.
///
/// The underlying handle is exclusively owned by the registry entry that
/// created it; callers hold an `Arc` and go through the closed-flag check.
pub struct CapabilitySession {
    kind: CapabilityKind,
    config: CapabilityConfig,
    capability: BoxCapability,
    closed: AtomicBool,
}

impl CapabilitySession {
    fn new(config: CapabilityConfig, capability: BoxCapability) -> Self {
        Self {
            kind: config.kind(),
            config,
            capability,
            closed: AtomicBool::new(false),
        }
    }

    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    /// The configuration fixed at creation time.
    pub fn config(&self) -> &CapabilityConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// One-shot request through this session.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, CapabilityError> {
        if self.is_closed() {
            return Err(CapabilityError::SessionClosed);
        }
        self.capability.generate(request).await
    }

    /// Streaming request through this session.
    pub fn stream(&self, request: GenerationRequest) -> ChunkStream {
        if self.is_closed() {
            return Box::pin(futures_util::stream::once(async {
                Err(CapabilityError::SessionClosed)
            }));
        }
        self.capability.stream(request)
    }
}

/// Lazily creates and caches one long-lived session per capability kind.
pub struct SessionRegistry {
    factory: BoxCapabilityFactory,
    /// The lock is held across creation, so a second request for a kind
    /// whose session is still being created queues behind the first
    /// instead of racing it.
    sessions: Mutex<HashMap<CapabilityKind, Arc<CapabilitySession>>>,
}

impl SessionRegistry {
    pub fn new(factory: BoxCapabilityFactory) -> Self {
        Self {
            factory,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Access the underlying factory (used by the prober).
    pub fn factory(&self) -> &BoxCapabilityFactory {
        &self.factory
    }

    /// Return the cached session for `config.kind()`, creating it if absent.
    ///
    /// Creation failures surface to the caller and leave the registry
    /// untouched, so the next dispatch retries creation.
    pub async fn get_or_create(
        &self,
        config: CapabilityConfig,
        progress: Option<ProgressCallback>,
    ) -> Result<Arc<CapabilitySession>, CapabilityError> {
        let kind = config.kind();
        let mut sessions = self.sessions.lock().await;

        if let Some(session) = sessions.get(&kind) {
            if session.config() != &config {
                tracing::debug!(
                    capability = %kind,
                    "reusing cached session; requested configuration ignored until reset"
                );
            }
            return Ok(Arc::clone(session));
        }

        tracing::info!(capability = %kind, "creating capability session");
        let capability = self.factory.create(config.clone(), progress).await?;
        let session = Arc::new(CapabilitySession::new(config, capability));
        sessions.insert(kind, Arc::clone(&session));
        Ok(session)
    }

    /// Tear down every cached session.
    ///
    /// Previously issued handles become unusable; the next request for any
    /// kind re-creates it with a fresh configuration and no retained
    /// conversational memory.
    pub async fn reset(&self) {
        let mut sessions = self.sessions.lock().await;
        for (kind, session) in sessions.drain() {
            tracing::info!(capability = %kind, "destroying capability session");
            session.close();
        }
    }

    /// Kinds with a live cached session, for diagnostics.
    pub async fn live_kinds(&self) -> Vec<CapabilityKind> {
        self.sessions.lock().await.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::runtime::{Capability, CapabilityFactory};
    use futures_util::StreamExt;
    use pagelens_types::capability::Availability;
    use std::sync::atomic::AtomicUsize;

    /// Capability that reports which creation it came from.
    struct NumberedCapability {
        kind: CapabilityKind,
        serial: usize,
    }

    impl Capability for NumberedCapability {
        fn kind(&self) -> CapabilityKind {
            self.kind
        }

        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<String, CapabilityError> {
            Ok(format!("serial-{}", self.serial))
        }

        fn stream(&self, _request: GenerationRequest) -> ChunkStream {
            let serial = self.serial;
            Box::pin(futures_util::stream::once(async move {
                Ok(format!("serial-{serial}"))
            }))
        }
    }

    struct CountingFactory {
        created: AtomicUsize,
    }

    impl CapabilityFactory for CountingFactory {
        async fn availability(
            &self,
            _kind: CapabilityKind,
        ) -> Result<Availability, CapabilityError> {
            Ok(Availability::Available)
        }

        async fn create(
            &self,
            config: CapabilityConfig,
            _progress: Option<ProgressCallback>,
        ) -> Result<BoxCapability, CapabilityError> {
            let serial = self.created.fetch_add(1, Ordering::SeqCst);
            Ok(BoxCapability::new(NumberedCapability {
                kind: config.kind(),
                serial,
            }))
        }
    }

    fn registry() -> SessionRegistry {
        SessionRegistry::new(BoxCapabilityFactory::new(CountingFactory {
            created: AtomicUsize::new(0),
        }))
    }

    #[tokio::test]
    async fn get_or_create_reuses_cached_session() {
        let registry = registry();
        let first = registry
            .get_or_create(CapabilityConfig::writer_default(), None)
            .await
            .unwrap();
        let second = registry
            .get_or_create(CapabilityConfig::writer_default(), None)
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let out = second
            .generate(&GenerationRequest::new("hi"))
            .await
            .unwrap();
        assert_eq!(out, "serial-0");
    }

    #[tokio::test]
    async fn differing_config_is_ignored_on_cached_session() {
        let registry = registry();
        let first = registry
            .get_or_create(
                CapabilityConfig::rewriter(pagelens_types::capability::RewriteTone::MoreFormal),
                None,
            )
            .await
            .unwrap();
        let second = registry
            .get_or_create(
                CapabilityConfig::rewriter(pagelens_types::capability::RewriteTone::MoreCasual),
                None,
            )
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        // Configuration stays as fixed at first creation.
        assert_eq!(
            second.config(),
            &CapabilityConfig::rewriter(pagelens_types::capability::RewriteTone::MoreFormal)
        );
    }

    #[tokio::test]
    async fn reset_invalidates_old_handles_and_recreates() {
        let registry = registry();
        let before = registry
            .get_or_create(CapabilityConfig::writer_default(), None)
            .await
            .unwrap();

        registry.reset().await;

        // The old handle refuses further requests.
        let err = before
            .generate(&GenerationRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, CapabilityError::SessionClosed));

        let mut stream = before.stream(GenerationRequest::new("hi"));
        assert!(matches!(
            stream.next().await,
            Some(Err(CapabilityError::SessionClosed))
        ));

        // The next request creates a fresh instance.
        let after = registry
            .get_or_create(CapabilityConfig::writer_default(), None)
            .await
            .unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        let out = after.generate(&GenerationRequest::new("hi")).await.unwrap();
        assert_eq!(out, "serial-1");
    }

    #[tokio::test]
    async fn one_session_per_kind() {
        let registry = registry();
        registry
            .get_or_create(CapabilityConfig::writer_default(), None)
            .await
            .unwrap();
        registry
            .get_or_create(CapabilityConfig::LanguageDetector, None)
            .await
            .unwrap();
        registry
            .get_or_create(CapabilityConfig::writer_default(), None)
            .await
            .unwrap();

        let mut kinds = registry.live_kinds().await;
        kinds.sort_by_key(|k| k.to_string());
        assert_eq!(
            kinds,
            vec![CapabilityKind::LanguageDetector, CapabilityKind::Writer]
        );
    }
}
