//! Capability availability probing.
//!
//! A pure read of host state: for each capability kind, ask the factory
//! whether it is usable, and demote any probing error to "unusable" so the
//! sweep never throws outward. The report gates chat initialization and
//! backs the status surface shown to the user.

use std::collections::HashMap;

use pagelens_types::capability::CapabilityKind;

use super::boxed::BoxCapabilityFactory;

/// Result of one availability sweep across all capability kinds.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProbeReport {
    pub per_capability: HashMap<CapabilityKind, bool>,
}

impl ProbeReport {
    /// Whether at least one capability is usable.
    pub fn any_available(&self) -> bool {
        self.per_capability.values().any(|usable| *usable)
    }

    /// Whether a specific kind is usable.
    pub fn is_usable(&self, kind: CapabilityKind) -> bool {
        self.per_capability.get(&kind).copied().unwrap_or(false)
    }
}

/// Probe every capability kind.
///
/// A failure probing one kind marks that kind unusable and the sweep
/// continues with the others.
pub async fn probe(factory: &BoxCapabilityFactory) -> ProbeReport {
    let mut per_capability = HashMap::with_capacity(CapabilityKind::ALL.len());

    for kind in CapabilityKind::ALL {
        let usable = match factory.availability(kind).await {
            Ok(availability) => availability.is_usable(),
            Err(err) => {
                tracing::warn!(capability = %kind, error = %err, "availability probe failed");
                false
            }
        };
        per_capability.insert(kind, usable);
    }

    ProbeReport { per_capability }
}
