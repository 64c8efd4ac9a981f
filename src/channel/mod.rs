//! The channel seam — the external collaborator that carries envelopes.
//!
//! Transport, framing, wire encoding, addressing and timeouts all live
//! behind [`Channel`]. The load-bearing contract is small: one `request()`
//! resolves to exactly one correlated response, delivered to the caller that
//! issued it even with many requests outstanding, and the bound handler is
//! handed exactly one request envelope per inbound call.

use std::sync::Arc;

use async_trait::async_trait;

use crate::protocol::{RequestEnvelope, ResponseEnvelope};

pub mod local;

/// Inbound entry point a channel delivers request envelopes to.
///
/// An `Err` is a defect: a condition the dispatcher refused to translate
/// into a response envelope. What happens to it next is the channel's
/// business — crash the request, not the process.
pub trait InboundHandler: Send + Sync {
    fn handle(&self, envelope: RequestEnvelope) -> Result<ResponseEnvelope, anyhow::Error>;
}

/// Abstract bidirectional transport between two agents.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Register the agent's inbound dispatcher entry point. Rebinding
    /// behavior is channel-defined.
    fn bind(&self, handler: Arc<dyn InboundHandler>);

    /// Send one request envelope to the remote peer and resolve to its
    /// correlated response. Transport failures are not part of the response
    /// taxonomy and propagate as-is.
    async fn request(&self, envelope: RequestEnvelope) -> Result<ResponseEnvelope, anyhow::Error>;
}
