//! Capability registry — the per-type table mapping callable identity to its
//! descriptor.
//!
//! The registry is keyed by [`OperationId`], not by public name. Name
//! resolution happens against the agent type's attribute table; the registry
//! only answers "is this specific callable exposed, and with what calling
//! convention". One consequence is deliberate and load-bearing: redefining a
//! name without re-exposing it leaves the new callable unregistered, so the
//! name dispatches as `Unknown` even though it still resolves locally.
//!
//! Built once per concrete type, at type-definition time, and shared by all
//! instances of the type. Never mutated afterwards.

use std::collections::HashMap;

use crate::capability::descriptor::CapabilityDescriptor;
use crate::operation::OperationId;

/// Per-type capability table.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    entries: HashMap<OperationId, CapabilityDescriptor>,
}

impl CapabilityRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under a callable's identity. A later entry for
    /// the same identity overlays the earlier one.
    pub fn register(&mut self, id: OperationId, descriptor: CapabilityDescriptor) {
        self.entries.insert(id, descriptor);
    }

    /// Copy in every entry of `base` that this registry does not define yet.
    ///
    /// The receiver's own entries win, so a type built as "copy ancestors,
    /// then overlay own exposures" calls this once per ancestor in
    /// resolution order.
    pub fn inherit(&mut self, base: &CapabilityRegistry) {
        for (id, descriptor) in &base.entries {
            self.entries
                .entry(*id)
                .or_insert_with(|| descriptor.clone());
        }
    }

    /// Look up the descriptor for a specific callable.
    pub fn descriptor(&self, id: OperationId) -> Option<&CapabilityDescriptor> {
        self.entries.get(&id)
    }

    /// Whether this callable is registered at all.
    pub fn contains(&self, id: OperationId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of registered callables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{handler, Operation};
    use serde_json::Value;

    fn noop() -> Operation {
        Operation::new(handler(|_, _| Ok(Value::Null)))
    }

    #[test]
    fn test_register_and_lookup() {
        let op = noop();
        let mut registry = CapabilityRegistry::new();
        registry.register(op.id(), CapabilityDescriptor::positional(2));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(op.id()));
        assert_eq!(
            registry.descriptor(op.id()).unwrap().positional_params,
            2
        );
    }

    #[test]
    fn test_lookup_is_by_identity_not_shape() {
        let exposed = noop();
        let shadow = noop();
        let mut registry = CapabilityRegistry::new();
        registry.register(exposed.id(), CapabilityDescriptor::positional(0));

        // Same handler shape, different callable: no entry.
        assert!(!registry.contains(shadow.id()));
    }

    #[test]
    fn test_inherit_keeps_own_entries() {
        let op = noop();
        let mut base = CapabilityRegistry::new();
        base.register(op.id(), CapabilityDescriptor::positional(1));

        let mut derived = CapabilityRegistry::new();
        derived.register(op.id(), CapabilityDescriptor::positional(3));
        derived.inherit(&base);

        assert_eq!(derived.descriptor(op.id()).unwrap().positional_params, 3);
    }

    #[test]
    fn test_inherit_copies_missing_entries() {
        let inherited = noop();
        let own = noop();

        let mut base = CapabilityRegistry::new();
        base.register(inherited.id(), CapabilityDescriptor::positional(1));

        let mut derived = CapabilityRegistry::new();
        derived.register(own.id(), CapabilityDescriptor::positional(2));
        derived.inherit(&base);

        assert_eq!(derived.len(), 2);
        assert!(derived.contains(inherited.id()));
        assert!(derived.contains(own.id()));
    }
}
