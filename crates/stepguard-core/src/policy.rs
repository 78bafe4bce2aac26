//! Forbidden-method policy.
//!
//! A named, immutable set of method names that must not execute when called
//! through a wrapped reference. Built once per proxy root and shared by `Arc`
//! with every proxy spawned from that root.

use std::collections::BTreeSet;

use crate::error::{Result, StepGuardError};

/// Capability query answered by every value, true only for proxies.
pub const FILTERS_FORBIDDEN_METHODS: &str = "filters_forbidden_methods?";

/// Escape hatch answered by proxies.
pub const AS_RAW: &str = "as_raw";

/// Names the proxy answers itself. They can never be forbidden.
pub const RESERVED_METHODS: [&str; 2] = [FILTERS_FORBIDDEN_METHODS, AS_RAW];

/// Immutable set of method names blocked at the proxy boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForbiddenMethodSet {
    name: String,
    methods: BTreeSet<String>,
}

impl ForbiddenMethodSet {
    /// Build a named set. Duplicates collapse; blank, whitespace-bearing and
    /// reserved names are rejected. An empty set forwards everything.
    pub fn new<I, S>(name: impl Into<String>, methods: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let mut out = BTreeSet::new();
        for m in methods {
            let m: String = m.into();
            if m.is_empty() || m.chars().any(char::is_whitespace) {
                return Err(StepGuardError::InvalidPolicy(format!(
                    "policy {name}: invalid method name {m:?}"
                )));
            }
            if RESERVED_METHODS.contains(&m.as_str()) {
                return Err(StepGuardError::InvalidPolicy(format!(
                    "policy {name}: {m} is reserved by the proxy"
                )));
            }
            out.insert(m);
        }
        Ok(Self { name, methods: out })
    }

    /// RSpec expectation syntax (`should` / `should_not`).
    pub fn rspec_expectations() -> Self {
        Self {
            name: "rspec_expectations".into(),
            methods: ["should", "should_not"].into_iter().map(String::from).collect(),
        }
    }

    /// Union of `self` and `other` under a new name.
    pub fn union(&self, name: impl Into<String>, other: &ForbiddenMethodSet) -> Self {
        Self {
            name: name.into(),
            methods: self.methods.union(&other.methods).cloned().collect(),
        }
    }

    /// Same methods under another name.
    pub fn renamed(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: self.methods,
        }
    }

    /// Names in `self` that `other` does not forbid.
    pub fn difference<'a>(&'a self, other: &'a ForbiddenMethodSet) -> impl Iterator<Item = &'a str> {
        self.methods.difference(&other.methods).map(String::as_str)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact-name membership. Arity and arguments are irrelevant.
    pub fn contains(&self, method: &str) -> bool {
        self.methods.contains(method)
    }

    /// Fail with `ForbiddenMethodInvoked` if `method` is in the set.
    pub fn check(&self, method: &str) -> Result<()> {
        if self.contains(method) {
            tracing::warn!(policy = %self.name, method, "forbidden method intercepted");
            return Err(StepGuardError::ForbiddenMethodInvoked(method.to_string()));
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
