//! Capability descriptor — the static calling-convention summary for one
//! exposed operation.
//!
//! Rust has no runtime signature reflection, so the descriptor is declared
//! at exposure time through the fluent constructors below and captured once
//! per type. Call-time validation reads it; nothing re-derives it per call.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Calling convention of one exposed operation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Named positional parameters, excluding the receiver.
    pub positional_params: usize,

    /// Whether a catch-all positional parameter is accepted.
    #[serde(default)]
    pub variadic_positional: bool,

    /// Names that may be supplied as keyword arguments.
    #[serde(default)]
    pub keyword_names: BTreeSet<String>,

    /// Whether a catch-all keyword parameter is accepted.
    #[serde(default)]
    pub variadic_keyword: bool,
}

impl CapabilityDescriptor {
    /// Descriptor for an operation taking exactly `count` positional
    /// parameters and no keywords.
    pub fn positional(count: usize) -> Self {
        Self {
            positional_params: count,
            variadic_positional: false,
            keyword_names: BTreeSet::new(),
            variadic_keyword: false,
        }
    }

    /// Add names that may be supplied as keyword arguments.
    pub fn with_keywords<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keyword_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Accept any number of extra positional arguments.
    pub fn with_variadic_positional(mut self) -> Self {
        self.variadic_positional = true;
        self
    }

    /// Accept arbitrary keyword names.
    pub fn with_variadic_keyword(mut self) -> Self {
        self.variadic_keyword = true;
        self
    }

    /// Whether `name` is acceptable as a keyword argument.
    pub fn accepts_keyword(&self, name: &str) -> bool {
        self.variadic_keyword || self.keyword_names.contains(name)
    }
}
