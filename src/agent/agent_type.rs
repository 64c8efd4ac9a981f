//! Agent types and the type-definition-time registration pass.
//!
//! An [`AgentType`] plays the role a class plays in a dynamic language: a
//! named, immutable bundle of an attribute table (public name → callable)
//! and a capability registry (callable identity → descriptor). The builder
//! is the registration pass — it runs once per concrete type, and every
//! instance of the type shares the result through an `Arc`.
//!
//! `expose` is the exposure marker: it attaches a callable under a name and
//! registers its descriptor. `define` attaches without registering, which is
//! how internal attributes are added — and how an exposed name can be
//! shadowed by an unregistered override, after which remote calls to it come
//! back `Unknown`.

use std::collections::HashMap;
use std::fmt;

use crate::capability::{CapabilityDescriptor, CapabilityRegistry};
use crate::errors::ConfigError;
use crate::operation::{Handler, Operation};

/// Prefix reserved for internal attributes. Exposed operation names must not
/// start with it; `define`d attributes may.
pub const INTERNAL_PREFIX: &str = "_";

/// Immutable, shared definition of an agent type.
pub struct AgentType {
    name: String,
    attributes: HashMap<String, Operation>,
    registry: CapabilityRegistry,
}

impl AgentType {
    /// Start the registration pass for a new concrete type.
    pub fn builder(name: impl Into<String>) -> AgentTypeBuilder {
        AgentTypeBuilder {
            name: name.into(),
            attributes: HashMap::new(),
            registry: CapabilityRegistry::new(),
            error: None,
        }
    }

    /// The type's name, for logging.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve a public name to its current callable, registered or not.
    pub fn resolve(&self, name: &str) -> Option<&Operation> {
        self.attributes.get(name)
    }

    /// The type's capability registry.
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Names whose current callable is actually registered — what a remote
    /// peer can reach. A name shadowed by an unexposed override is absent
    /// here even though [`AgentType::resolve`] still finds it.
    pub fn capability_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .attributes
            .iter()
            .filter(|(_, op)| self.registry.contains(op.id()))
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentType")
            .field("name", &self.name)
            .field("attributes", &self.attributes.len())
            .field("registered", &self.registry.len())
            .finish()
    }
}

/// The registration pass, run exactly once per concrete type.
pub struct AgentTypeBuilder {
    name: String,
    attributes: HashMap<String, Operation>,
    registry: CapabilityRegistry,
    error: Option<ConfigError>,
}

impl AgentTypeBuilder {
    /// Inherit `base`'s attribute table and registry.
    ///
    /// Own definitions overlay inherited ones regardless of call order;
    /// chain multiple `extends` calls to model a base-type chain, earliest
    /// call winning on conflicts.
    pub fn extends(mut self, base: &AgentType) -> Self {
        for (name, op) in &base.attributes {
            self.attributes
                .entry(name.clone())
                .or_insert_with(|| op.clone());
        }
        self.registry.inherit(&base.registry);
        self
    }

    /// Expose `handler` as a remotely callable operation under `name`.
    ///
    /// Attaches the callable as an attribute and registers its descriptor
    /// under the callable's identity.
    pub fn expose(
        mut self,
        name: impl Into<String>,
        descriptor: CapabilityDescriptor,
        handler: impl Handler + 'static,
    ) -> Self {
        let name = name.into();
        if name.starts_with(INTERNAL_PREFIX) {
            if self.error.is_none() {
                self.error = Some(ConfigError::ReservedName { name });
            }
            return self;
        }
        let operation = Operation::new(handler);
        self.registry.register(operation.id(), descriptor);
        self.attributes.insert(name, operation);
        self
    }

    /// Attach a callable under `name` without registering it.
    ///
    /// Internal attributes go through here. So does the deliberate trap:
    /// shadowing an exposed name with `define` leaves the new callable out
    /// of the registry, and the name stops being remotely callable.
    pub fn define(mut self, name: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.attributes.insert(name.into(), Operation::new(handler));
        self
    }

    /// Finish the registration pass.
    ///
    /// Fails with a [`ConfigError`] — a construction-time error, not a
    /// dispatch-time one — if any exposed name used the internal prefix.
    pub fn build(self) -> Result<AgentType, ConfigError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(AgentType {
            name: self.name,
            attributes: self.attributes,
            registry: self.registry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::handler;
    use serde_json::{json, Value};

    fn ping_type() -> AgentType {
        AgentType::builder("Pinger")
            .expose(
                "ping",
                CapabilityDescriptor::positional(0),
                handler(|_, _| Ok(json!("pong"))),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_expose_attaches_and_registers() {
        let ty = ping_type();
        let op = ty.resolve("ping").unwrap();
        assert!(ty.registry().contains(op.id()));
        assert_eq!(ty.capability_names(), vec!["ping"]);
    }

    #[test]
    fn test_reserved_name_fails_construction() {
        let result = AgentType::builder("Bad")
            .expose(
                "_secret",
                CapabilityDescriptor::positional(0),
                handler(|_, _| Ok(Value::Null)),
            )
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::ReservedName { name }) if name == "_secret"
        ));
    }

    #[test]
    fn test_define_allows_internal_prefix() {
        let ty = AgentType::builder("Internal")
            .define("_scratch", handler(|_, _| Ok(Value::Null)))
            .build()
            .unwrap();
        assert!(ty.resolve("_scratch").is_some());
        assert!(ty.capability_names().is_empty());
    }

    #[test]
    fn test_extends_inherits_attributes_and_registry() {
        let base = ping_type();
        let derived = AgentType::builder("Derived")
            .extends(&base)
            .expose(
                "extra",
                CapabilityDescriptor::positional(1),
                handler(|args, _| Ok(args[0].clone())),
            )
            .build()
            .unwrap();

        // Inherited callable keeps its identity and registration.
        let inherited = derived.resolve("ping").unwrap();
        assert_eq!(inherited.id(), base.resolve("ping").unwrap().id());
        assert!(derived.registry().contains(inherited.id()));
        assert_eq!(derived.capability_names(), vec!["extra", "ping"]);
    }

    #[test]
    fn test_override_with_re_exposure_replaces_entry() {
        let base = ping_type();
        let derived = AgentType::builder("Derived")
            .extends(&base)
            .expose(
                "ping",
                CapabilityDescriptor::positional(0),
                handler(|_, _| Ok(json!("pong v2"))),
            )
            .build()
            .unwrap();

        let op = derived.resolve("ping").unwrap();
        assert_ne!(op.id(), base.resolve("ping").unwrap().id());
        assert!(derived.registry().contains(op.id()));
        // The ancestor's entry is still in the table: the registry is total
        // over the ancestry, keyed by identity.
        assert!(derived
            .registry()
            .contains(base.resolve("ping").unwrap().id()));
    }

    #[test]
    fn test_override_without_re_exposure_leaves_callable_unregistered() {
        let base = ping_type();
        let derived = AgentType::builder("Derived")
            .extends(&base)
            .define("ping", handler(|_, _| Ok(json!("shadowed"))))
            .build()
            .unwrap();

        // The name still resolves...
        let shadow = derived.resolve("ping").unwrap();
        // ...but the new callable has no registry entry, so the name is not
        // remotely callable any more.
        assert!(!derived.registry().contains(shadow.id()));
        assert!(derived.capability_names().is_empty());
        // The old callable's entry survives, keyed by its identity.
        assert!(derived
            .registry()
            .contains(base.resolve("ping").unwrap().id()));
    }
}
