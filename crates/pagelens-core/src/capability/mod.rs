//! Capability abstraction: traits, box wrappers, prober, and the
//! one-live-session-per-kind registry.

pub mod boxed;
pub mod prober;
pub mod registry;
pub mod runtime;

pub use boxed::{BoxCapability, BoxCapabilityFactory};
pub use prober::{probe, ProbeReport};
pub use registry::{CapabilitySession, SessionRegistry};
pub use runtime::{Capability, CapabilityFactory, ChunkStream, ProgressCallback};
