//! Error taxonomy for the dispatch layer.
//!
//! Two families live here. Expected, recoverable outcomes (`CallError`,
//! `ApplicationFailure`, `ArgumentFault`) cross the channel as data. Anything
//! else is a defect: it rides `anyhow::Error` out of the dispatch path
//! untranslated and never becomes a response envelope.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Configuration error raised while building an agent type.
///
/// These surface at type-construction time, never at dispatch time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Exposed operation names must not use the internal-attribute prefix.
    #[error("exposed operation name '{name}' starts with the reserved internal prefix '_'")]
    ReservedName { name: String },
}

/// Lifecycle errors on an [`Agent`](crate::agent::Agent).
#[derive(Debug, Error)]
pub enum AgentError {
    /// The agent was already bound to a channel.
    #[error("agent is already bound to a channel")]
    AlreadyBound,
}

/// The recoverable-failure family.
///
/// Operations raise this (or convert their own domain errors into it) to
/// report an expected, domain-level failure. The dispatcher turns it into a
/// `Failure` response whose payload is the failure's constructor arguments,
/// verbatim. Errors outside this family are defects and propagate instead.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("application failure: {payload:?}")]
pub struct ApplicationFailure {
    /// Constructor arguments of the original failure.
    pub payload: Vec<Value>,
}

impl ApplicationFailure {
    /// Wrap the failure's constructor arguments.
    pub fn new(payload: Vec<Value>) -> Self {
        Self { payload }
    }

    /// The payload as it travels on the wire: a JSON array.
    pub fn to_payload(&self) -> Value {
        Value::Array(self.payload.clone())
    }
}

/// Structured detail carried by an `Invalid` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentFault {
    /// Signed arity delta: positive means the caller supplied that many too
    /// few positional arguments, negative means that many too many.
    Arity(i64),
    /// Keyword names the operation does not accept, sorted.
    UnexpectedKeywords(Vec<String>),
}

impl ArgumentFault {
    /// Wire payload: the signed delta, or the list of offending names.
    pub fn to_payload(&self) -> Value {
        match self {
            Self::Arity(delta) => Value::from(*delta),
            Self::UnexpectedKeywords(names) => Value::from(names.clone()),
        }
    }

    /// Decode a payload produced by [`ArgumentFault::to_payload`].
    ///
    /// Returns `None` when the value is neither a signed integer nor an
    /// array of strings.
    pub fn from_payload(value: &Value) -> Option<Self> {
        if let Some(delta) = value.as_i64() {
            return Some(Self::Arity(delta));
        }
        let names: Option<Vec<String>> = value
            .as_array()?
            .iter()
            .map(|name| name.as_str().map(str::to_string))
            .collect();
        names.map(Self::UnexpectedKeywords)
    }
}

impl fmt::Display for ArgumentFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arity(delta) if *delta > 0 => {
                write!(f, "{} positional argument(s) missing", delta)
            }
            Self::Arity(delta) => write!(f, "{} positional argument(s) too many", -delta),
            Self::UnexpectedKeywords(names) => {
                write!(f, "unexpected keyword(s): {}", names.join(", "))
            }
        }
    }
}

/// Everything a remote call can come back as, other than a normal value.
///
/// The first three variants mirror the non-success response kinds; the rest
/// are local or transport conditions outside the response taxonomy.
#[derive(Debug, Error)]
pub enum CallError {
    /// The callee has no registered capability under this name.
    #[error("unknown remote operation '{operation}'")]
    UnknownOperation { operation: String },

    /// The callee rejected the call shape before invoking anything.
    #[error("invalid arguments for '{operation}': {fault}")]
    InvalidArguments {
        operation: String,
        fault: ArgumentFault,
    },

    /// The operation ran and reported an expected failure. The payload is
    /// the original failure's constructor arguments — data, not a re-thrown
    /// error object, so the callee-side dynamic type is not recoverable.
    #[error("remote operation '{operation}' failed: {payload}")]
    ApplicationFailure { operation: String, payload: Value },

    /// No channel has been bound yet.
    #[error("agent is not bound to a channel")]
    NotBound,

    /// The channel itself failed; not part of the response taxonomy.
    #[error("channel request failed")]
    Channel(#[source] anyhow::Error),
}
