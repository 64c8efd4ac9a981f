//! Wire envelopes exchanged over a channel.
//!
//! Two shapes only: a request naming an operation with its arguments, and a
//! response carrying one of four outcome kinds plus a payload. Encoding,
//! framing and addressing belong to the channel implementation; these types
//! just derive serde so any channel can carry them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ArgumentFault;

/// One remote-call request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Public name of the operation to invoke.
    pub operation: String,

    /// Positional arguments, in call order.
    #[serde(default)]
    pub args: Vec<Value>,

    /// Keyword arguments.
    #[serde(default)]
    pub kwargs: HashMap<String, Value>,
}

impl RequestEnvelope {
    pub fn new(
        operation: impl Into<String>,
        args: Vec<Value>,
        kwargs: HashMap<String, Value>,
    ) -> Self {
        Self {
            operation: operation.into(),
            args,
            kwargs,
        }
    }
}

/// Outcome kind of a handled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// The name does not resolve to a registered capability on the callee.
    Unknown,
    /// The call shape was rejected before the operation ran.
    Invalid,
    /// The operation ran and reported an expected failure.
    Failure,
    /// The operation completed normally.
    Success,
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Invalid => write!(f, "invalid"),
            Self::Failure => write!(f, "failure"),
            Self::Success => write!(f, "success"),
        }
    }
}

/// One remote-call response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub kind: ResponseKind,

    /// Kind-dependent payload: the return value for `Success`, the argument
    /// fault for `Invalid`, the failure's constructor arguments for
    /// `Failure`, null for `Unknown`.
    #[serde(default)]
    pub payload: Value,
}

impl ResponseEnvelope {
    /// The operation completed; `payload` is its return value.
    pub fn success(payload: Value) -> Self {
        Self {
            kind: ResponseKind::Success,
            payload,
        }
    }

    /// No registered capability under the requested name.
    pub fn unknown() -> Self {
        Self {
            kind: ResponseKind::Unknown,
            payload: Value::Null,
        }
    }

    /// The call shape was rejected; the fault says exactly how.
    pub fn invalid(fault: &ArgumentFault) -> Self {
        Self {
            kind: ResponseKind::Invalid,
            payload: fault.to_payload(),
        }
    }

    /// The operation reported an expected failure; `payload` reproduces its
    /// constructor arguments.
    pub fn failure(payload: Value) -> Self {
        Self {
            kind: ResponseKind::Failure,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let envelope = RequestEnvelope::new("add", vec![json!(2), json!(3)], HashMap::new());
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"operation\":\"add\""));
        assert!(json.contains("\"args\":[2,3]"));
    }

    #[test]
    fn test_request_defaults_on_deserialize() {
        let envelope: RequestEnvelope =
            serde_json::from_str(r#"{"operation": "ping"}"#).unwrap();
        assert_eq!(envelope.operation, "ping");
        assert!(envelope.args.is_empty());
        assert!(envelope.kwargs.is_empty());
    }

    #[test]
    fn test_response_kind_wire_names() {
        let json = serde_json::to_string(&ResponseKind::Unknown).unwrap();
        assert_eq!(json, "\"unknown\"");
        let kind: ResponseKind = serde_json::from_str("\"success\"").unwrap();
        assert_eq!(kind, ResponseKind::Success);
    }

    #[test]
    fn test_unknown_has_null_payload() {
        let envelope = ResponseEnvelope::unknown();
        assert_eq!(envelope.kind, ResponseKind::Unknown);
        assert_eq!(envelope.payload, Value::Null);
    }

    #[test]
    fn test_invalid_carries_fault_payload() {
        let envelope = ResponseEnvelope::invalid(&ArgumentFault::Arity(1));
        assert_eq!(envelope.payload, json!(1));

        let envelope =
            ResponseEnvelope::invalid(&ArgumentFault::UnexpectedKeywords(vec!["z".to_string()]));
        assert_eq!(envelope.payload, json!(["z"]));
    }
}
