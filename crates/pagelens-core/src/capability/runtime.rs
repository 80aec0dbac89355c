//! Capability and factory trait definitions.
//!
//! These are the seams to the host's on-device AI runtime. Uses RPITIT for
//! `generate` and the factory methods, and `Pin<Box<dyn Stream>>` for
//! `stream` (streams need to be object-safe for the box wrappers).

use std::pin::Pin;

use futures_util::Stream;

use pagelens_types::capability::{
    Availability, CapabilityConfig, CapabilityError, CapabilityKind, GenerationRequest,
};

/// A lazy, finite, non-restartable sequence of generated text fragments.
pub type ChunkStream =
    Pin<Box<dyn Stream<Item = Result<String, CapabilityError>> + Send + 'static>>;

/// Callback invoked with download-progress percentages (0-100) while a
/// session creation triggers a one-time model download.
pub type ProgressCallback = Box<dyn Fn(u8) + Send + Sync>;

/// A live, initialized capability instance.
///
/// Implementations live in `pagelens-infra` (e.g., the OpenAI-compatible
/// local runtime). Dropping a capability releases it; there is no separate
/// destroy call.
pub trait Capability: Send + Sync {
    /// Which capability this instance serves.
    fn kind(&self) -> CapabilityKind;

    /// One-shot request returning the full generated text.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl std::future::Future<Output = Result<String, CapabilityError>> + Send;

    /// Streaming request. Fragments arrive in generation order.
    ///
    /// Returns a boxed stream (not RPITIT) because streams need to be
    /// object-safe for the `BoxCapability` wrapper.
    fn stream(&self, request: GenerationRequest) -> ChunkStream;
}

/// Entry point into the host runtime: availability queries and session
/// creation.
pub trait CapabilityFactory: Send + Sync {
    /// Query whether a capability can be used on this device.
    fn availability(
        &self,
        kind: CapabilityKind,
    ) -> impl std::future::Future<Output = Result<Availability, CapabilityError>> + Send;

    /// Create a capability instance with the given configuration.
    ///
    /// Potentially slow: may trigger a one-time model download, reported
    /// through `progress` when provided.
    fn create(
        &self,
        config: CapabilityConfig,
        progress: Option<ProgressCallback>,
    ) -> impl std::future::Future<Output = Result<super::BoxCapability, CapabilityError>> + Send;
}
