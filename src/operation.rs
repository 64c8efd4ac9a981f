//! Callables and callable identity.
//!
//! An [`Operation`] is a [`Handler`] plus a process-unique [`OperationId`].
//! The capability registry is keyed by that identity — not by public name —
//! so two operations wrapping identical logic are still two distinct
//! callables, and cloning an operation (as type inheritance does) preserves
//! its identity.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::errors::ApplicationFailure;

/// What an operation invocation can come back as, from the handler's side.
#[derive(Debug, Error)]
pub enum OperationError {
    /// An expected, recoverable failure; becomes a `Failure` response.
    #[error(transparent)]
    Failure(#[from] ApplicationFailure),

    /// Anything else. Never translated into a response envelope; the
    /// dispatcher lets it propagate.
    #[error(transparent)]
    Defect(#[from] anyhow::Error),
}

/// A callable that can be attached to an agent type.
///
/// Arguments arrive exactly as the request envelope carried them; binding
/// keyword arguments to parameters is the handler's own business.
pub trait Handler: Send + Sync {
    fn call(
        &self,
        args: &[Value],
        kwargs: &HashMap<String, Value>,
    ) -> Result<Value, OperationError>;
}

impl<F> Handler for F
where
    F: Fn(&[Value], &HashMap<String, Value>) -> Result<Value, OperationError> + Send + Sync,
{
    fn call(
        &self,
        args: &[Value],
        kwargs: &HashMap<String, Value>,
    ) -> Result<Value, OperationError> {
        self(args, kwargs)
    }
}

/// Identity helper that pins a closure to the [`Handler`] signature, so call
/// sites can hand plain closures to `expose`/`define` without type-inference
/// friction.
pub fn handler<F>(f: F) -> F
where
    F: Fn(&[Value], &HashMap<String, Value>) -> Result<Value, OperationError> + Send + Sync,
{
    f
}

/// Identity of one specific callable — not its public name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(u64);

static NEXT_OPERATION_ID: AtomicU64 = AtomicU64::new(1);

/// A handler with identity.
///
/// Created once per exposed (or defined) callable; cloning shares both the
/// handler and the identity.
#[derive(Clone)]
pub struct Operation {
    id: OperationId,
    handler: Arc<dyn Handler>,
}

impl Operation {
    /// Wrap a handler, allocating a fresh identity.
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self {
            id: OperationId(NEXT_OPERATION_ID.fetch_add(1, Ordering::Relaxed)),
            handler: Arc::new(handler),
        }
    }

    /// This callable's identity.
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Invoke the underlying handler.
    pub fn invoke(
        &self,
        args: &[Value],
        kwargs: &HashMap<String, Value>,
    ) -> Result<Value, OperationError> {
        self.handler.call(args, kwargs)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
