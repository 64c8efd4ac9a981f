//! # caplink
//!
//! Capability-exposure and remote-call dispatch between agents.
//!
//! One endpoint — the [`Agent`] — exposes a fixed, declared set of callable
//! operations over an abstract bidirectional [`Channel`]; a remote peer
//! invokes them as though they were local calls, with strict argument
//! validation and a typed outcome: success, not-found, bad-arguments or
//! application-failure.
//!
//! The pieces, leaves first:
//! - [`CapabilityDescriptor`] — per-operation calling-convention summary,
//!   captured once at type-definition time;
//! - [`CapabilityRegistry`] — the per-type table, keyed by callable identity
//!   rather than public name and inherited down type chains;
//! - [`AgentType`] — the once-per-type registration pass ([`AgentTypeBuilder`]
//!   with `expose` as the exposure marker);
//! - [`Agent`] — dispatcher (inbound) and proxy (outbound) in one object;
//! - [`Channel`] — the transport seam; [`channel::local`] ships an
//!   in-process reference pair for tests and demos.
//!
//! Expected failures cross the wire as data ([`ApplicationFailure`] becomes
//! a `Failure` response, surfaced to the caller as
//! [`CallError::ApplicationFailure`]); everything else is a defect and
//! propagates out of the dispatch path untranslated.

pub mod agent;
pub mod capability;
pub mod channel;
pub mod errors;
pub mod operation;
pub mod protocol;

pub use agent::{Agent, AgentType, AgentTypeBuilder, RemoteOperation};
pub use capability::{CapabilityDescriptor, CapabilityRegistry};
pub use channel::{Channel, InboundHandler};
pub use errors::{AgentError, ApplicationFailure, ArgumentFault, CallError, ConfigError};
pub use operation::{Handler, Operation, OperationError, OperationId};
pub use protocol::{RequestEnvelope, ResponseEnvelope, ResponseKind};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
