//! The agent — one object playing both protocol roles.
//!
//! Inbound, the agent is the dispatcher: the channel hands it request
//! envelopes and gets response envelopes back, with strict argument
//! validation in front of every invocation. Outbound, it is the proxy:
//! [`Agent::call`] turns a local-looking invocation into a single round trip
//! through the bound channel — the only suspend point in the crate.
//!
//! Both directions share nothing mutable beyond the registry (immutable once
//! the type is built) and the channel slot (set once at bind time), so both
//! are freely reentrant with no locks.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::agent::agent_type::AgentType;
use crate::capability::CapabilityDescriptor;
use crate::channel::{Channel, InboundHandler};
use crate::errors::{AgentError, ArgumentFault, CallError};
use crate::operation::OperationError;
use crate::protocol::{RequestEnvelope, ResponseEnvelope, ResponseKind};

/// A runtime instance of an [`AgentType`], bound to at most one channel.
pub struct Agent {
    agent_type: Arc<AgentType>,
    channel: OnceCell<Arc<dyn Channel>>,
    // Handle on our own Arc, so bind() can hand the channel an owning
    // reference to use as the inbound handler.
    weak: Weak<Agent>,
}

impl Agent {
    /// Create an instance of `agent_type`. The type — and with it the
    /// capability registry — is shared with every other instance.
    pub fn new(agent_type: Arc<AgentType>) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            agent_type,
            channel: OnceCell::new(),
            weak: weak.clone(),
        })
    }

    /// The type this agent was instantiated from.
    pub fn agent_type(&self) -> &AgentType {
        &self.agent_type
    }

    /// Bind this agent to its channel, exactly once, and register it as the
    /// channel's inbound handler.
    pub fn bind(&self, channel: Arc<dyn Channel>) -> Result<(), AgentError> {
        self.channel
            .set(channel.clone())
            .map_err(|_| AgentError::AlreadyBound)?;
        if let Some(this) = self.weak.upgrade() {
            channel.bind(this);
        }
        log::debug!("agent of type {} bound to channel", self.agent_type.name());
        Ok(())
    }

    /// Handle one inbound request envelope.
    ///
    /// Validation failures are produced here and never reach the operation.
    /// An expected [`ApplicationFailure`](crate::errors::ApplicationFailure)
    /// from the operation becomes a `Failure` response; any other error is a
    /// defect and propagates as `Err`, untranslated.
    pub fn dispatch(&self, envelope: RequestEnvelope) -> Result<ResponseEnvelope, anyhow::Error> {
        let Some(operation) = self.agent_type.resolve(&envelope.operation) else {
            log::debug!("dispatch {}: no such attribute", envelope.operation);
            return Ok(ResponseEnvelope::unknown());
        };
        let Some(descriptor) = self.agent_type.registry().descriptor(operation.id()) else {
            // The name resolves, but the callable behind it was never exposed
            // (typically an override that dropped the exposure marker).
            log::debug!("dispatch {}: callable is not registered", envelope.operation);
            return Ok(ResponseEnvelope::unknown());
        };

        if let Some(fault) = validate(descriptor, &envelope) {
            log::debug!("dispatch {}: {}", envelope.operation, fault);
            return Ok(ResponseEnvelope::invalid(&fault));
        }

        match operation.invoke(&envelope.args, &envelope.kwargs) {
            Ok(value) => Ok(ResponseEnvelope::success(value)),
            Err(OperationError::Failure(failure)) => {
                log::debug!(
                    "dispatch {}: application failure {:?}",
                    envelope.operation,
                    failure.payload
                );
                Ok(ResponseEnvelope::failure(failure.to_payload()))
            }
            Err(OperationError::Defect(defect)) => Err(defect),
        }
    }

    /// Invoke a remote operation through the bound channel.
    pub async fn call(
        &self,
        operation: &str,
        args: Vec<Value>,
        kwargs: HashMap<String, Value>,
    ) -> Result<Value, CallError> {
        let channel = self.channel.get().ok_or(CallError::NotBound)?;
        let envelope = RequestEnvelope::new(operation, args, kwargs);
        let response = channel.request(envelope).await.map_err(CallError::Channel)?;
        log::debug!("call {}: {}", operation, response.kind);
        unpack(operation, response)
    }

    /// Invoke a remote operation with positional arguments only.
    pub async fn call_positional(
        &self,
        operation: &str,
        args: Vec<Value>,
    ) -> Result<Value, CallError> {
        self.call(operation, args, HashMap::new()).await
    }

    /// A bound remote-call object capturing one operation name.
    pub fn remote(&self, operation: &str) -> RemoteOperation<'_> {
        RemoteOperation {
            agent: self,
            operation: operation.to_string(),
        }
    }
}

impl InboundHandler for Agent {
    fn handle(&self, envelope: RequestEnvelope) -> Result<ResponseEnvelope, anyhow::Error> {
        self.dispatch(envelope)
    }
}

/// A local-looking handle for one remote operation.
pub struct RemoteOperation<'a> {
    agent: &'a Agent,
    operation: String,
}

impl RemoteOperation<'_> {
    /// The captured operation name.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub async fn invoke(
        &self,
        args: Vec<Value>,
        kwargs: HashMap<String, Value>,
    ) -> Result<Value, CallError> {
        self.agent.call(&self.operation, args, kwargs).await
    }
}

/// Check an envelope's call shape against a descriptor.
///
/// Positional check first, keyword check second — fixed order, so a call
/// failing both reports the arity fault. Keyword arguments naming declared
/// parameters count toward the positional requirement, as they would in a
/// direct call.
fn validate(descriptor: &CapabilityDescriptor, envelope: &RequestEnvelope) -> Option<ArgumentFault> {
    if !descriptor.variadic_positional {
        let matched_keywords = envelope
            .kwargs
            .keys()
            .filter(|name| descriptor.keyword_names.contains(*name))
            .count();
        let delta = descriptor.positional_params as i64
            - envelope.args.len() as i64
            - matched_keywords as i64;
        if delta != 0 {
            return Some(ArgumentFault::Arity(delta));
        }
    }

    if !descriptor.variadic_keyword {
        let mut extra: Vec<String> = envelope
            .kwargs
            .keys()
            .filter(|name| !descriptor.keyword_names.contains(*name))
            .cloned()
            .collect();
        if !extra.is_empty() {
            extra.sort_unstable();
            return Some(ArgumentFault::UnexpectedKeywords(extra));
        }
    }

    None
}

/// Turn a response envelope into the caller-side outcome.
fn unpack(operation: &str, response: ResponseEnvelope) -> Result<Value, CallError> {
    match response.kind {
        ResponseKind::Success => Ok(response.payload),
        ResponseKind::Unknown => Err(CallError::UnknownOperation {
            operation: operation.to_string(),
        }),
        ResponseKind::Invalid => match ArgumentFault::from_payload(&response.payload) {
            Some(fault) => Err(CallError::InvalidArguments {
                operation: operation.to_string(),
                fault,
            }),
            None => Err(CallError::Channel(anyhow::anyhow!(
                "malformed invalid-arguments payload: {}",
                response.payload
            ))),
        },
        ResponseKind::Failure => Err(CallError::ApplicationFailure {
            operation: operation.to_string(),
            payload: response.payload,
        }),
    }
}
