//! Object-safe dynamic dispatch wrappers for [`Capability`] and
//! [`CapabilityFactory`].
//!
//! Same three-step pattern for each trait:
//! 1. Define an object-safe `*Dyn` trait with boxed futures
//! 2. Blanket-impl `*Dyn` for all implementors of the RPITIT trait
//! 3. Wrap `Box<dyn *Dyn>` and delegate

use std::future::Future;
use std::pin::Pin;

use pagelens_types::capability::{
    Availability, CapabilityConfig, CapabilityError, CapabilityKind, GenerationRequest,
};

use super::runtime::{Capability, CapabilityFactory, ChunkStream, ProgressCallback};

/// Object-safe version of [`Capability`] with boxed futures.
pub trait CapabilityDyn: Send + Sync {
    fn kind(&self) -> CapabilityKind;

    fn generate_boxed<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, CapabilityError>> + Send + 'a>>;

    fn stream_boxed(&self, request: GenerationRequest) -> ChunkStream;
}

impl<T: Capability> CapabilityDyn for T {
    fn kind(&self) -> CapabilityKind {
        Capability::kind(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, CapabilityError>> + Send + 'a>> {
        Box::pin(self.generate(request))
    }

    fn stream_boxed(&self, request: GenerationRequest) -> ChunkStream {
        self.stream(request)
    }
}

/// Type-erased capability instance, the `handle` owned by a registry entry.
pub struct BoxCapability {
    inner: Box<dyn CapabilityDyn + Send + Sync>,
}

impl BoxCapability {
    /// Wrap a concrete [`Capability`] in a type-erased box.
    pub fn new<T: Capability + 'static>(capability: T) -> Self {
        Self {
            inner: Box::new(capability),
        }
    }

    pub fn kind(&self) -> CapabilityKind {
        self.inner.kind()
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, CapabilityError> {
        self.inner.generate_boxed(request).await
    }

    pub fn stream(&self, request: GenerationRequest) -> ChunkStream {
        self.inner.stream_boxed(request)
    }
}

/// Object-safe version of [`CapabilityFactory`] with boxed futures.
pub trait CapabilityFactoryDyn: Send + Sync {
    fn availability_boxed(
        &self,
        kind: CapabilityKind,
    ) -> Pin<Box<dyn Future<Output = Result<Availability, CapabilityError>> + Send + '_>>;

    fn create_boxed(
        &self,
        config: CapabilityConfig,
        progress: Option<ProgressCallback>,
    ) -> Pin<Box<dyn Future<Output = Result<BoxCapability, CapabilityError>> + Send + '_>>;
}

impl<T: CapabilityFactory> CapabilityFactoryDyn for T {
    fn availability_boxed(
        &self,
        kind: CapabilityKind,
    ) -> Pin<Box<dyn Future<Output = Result<Availability, CapabilityError>> + Send + '_>> {
        Box::pin(self.availability(kind))
    }

    fn create_boxed(
        &self,
        config: CapabilityConfig,
        progress: Option<ProgressCallback>,
    ) -> Pin<Box<dyn Future<Output = Result<BoxCapability, CapabilityError>> + Send + '_>> {
        Box::pin(self.create(config, progress))
    }
}

/// Type-erased capability factory for runtime selection.
pub struct BoxCapabilityFactory {
    inner: Box<dyn CapabilityFactoryDyn + Send + Sync>,
}

impl BoxCapabilityFactory {
    /// Wrap a concrete [`CapabilityFactory`] in a type-erased box.
    pub fn new<T: CapabilityFactory + 'static>(factory: T) -> Self {
        Self {
            inner: Box::new(factory),
        }
    }

    pub async fn availability(
        &self,
        kind: CapabilityKind,
    ) -> Result<Availability, CapabilityError> {
        self.inner.availability_boxed(kind).await
    }

    pub async fn create(
        &self,
        config: CapabilityConfig,
        progress: Option<ProgressCallback>,
    ) -> Result<BoxCapability, CapabilityError> {
        self.inner.create_boxed(config, progress).await
    }
}
