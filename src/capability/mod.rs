//! Capability descriptors and the per-type capability registry.
//!
//! A capability is an operation deliberately marked as remotely callable.
//! The descriptor summarizes its calling convention once, at type-definition
//! time; the registry holds every descriptor ever exposed in a type's
//! ancestry, keyed by callable identity.

pub mod descriptor;
pub mod registry;

pub use descriptor::CapabilityDescriptor;
pub use registry::CapabilityRegistry;
