//! Agent runtime: the per-type registration pass and the two-sided protocol.

pub mod agent_type;
pub mod core;

pub use agent_type::{AgentType, AgentTypeBuilder, INTERNAL_PREFIX};
pub use core::{Agent, RemoteOperation};
