//! Recursive wrap policy and proxy roots.
//!
//! A root owns one forbidden-method set and one identity cache. Every proxy it
//! creates, directly or as the result of a forwarded call, shares both.

use std::fmt;
use std::sync::Arc;

use crate::cache::IdentityCache;
use crate::policy::ForbiddenMethodSet;
use crate::proxy::ProxyHandle;
use crate::value::{ObjectRef, Value};

/// How a value is treated when it crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapClass {
    /// Nil and scalars: returned unchanged.
    Opaque,
    /// Already a proxy: returned unchanged, never nested.
    AlreadyWrapped,
    /// Structured target: wrapped under the caller's root.
    Wrappable,
}

/// Classify a value. Total and infallible.
pub fn classify(value: &Value) -> WrapClass {
    match value {
        Value::Nil
        | Value::Bool(_)
        | Value::Int(_)
        | Value::Float(_)
        | Value::Str(_)
        | Value::Symbol(_)
        | Value::Bytes(_) => WrapClass::Opaque,
        Value::Proxy(_) => WrapClass::AlreadyWrapped,
        Value::Object(_) => WrapClass::Wrappable,
    }
}

struct RootShared {
    policy: Arc<ForbiddenMethodSet>,
    cache: IdentityCache,
}

/// Scope owning one policy and one identity cache.
#[derive(Clone)]
pub struct ProxyRoot {
    shared: Arc<RootShared>,
}

impl ProxyRoot {
    pub fn new(policy: ForbiddenMethodSet) -> Self {
        Self::with_policy(Arc::new(policy))
    }

    /// Build a root around an already-shared policy (one per scenario, say,
    /// all drawing on the same compiled set).
    pub fn with_policy(policy: Arc<ForbiddenMethodSet>) -> Self {
        Self {
            shared: Arc::new(RootShared {
                policy,
                cache: IdentityCache::new(),
            }),
        }
    }

    pub fn forbidden_set(&self) -> &Arc<ForbiddenMethodSet> {
        &self.shared.policy
    }

    pub fn cache(&self) -> &IdentityCache {
        &self.shared.cache
    }

    /// Put `value` behind the filter. Only `classify`'s `Wrappable` values
    /// (raw objects) are wrapped; everything else comes back unchanged.
    pub fn wrap(&self, value: Value) -> Value {
        match value {
            Value::Object(raw) => Value::Proxy(self.wrap_object(raw)),
            other => other,
        }
    }

    /// Proxy for `raw`, reusing the live one if this root already made it.
    pub fn wrap_object(&self, raw: ObjectRef) -> ProxyHandle {
        let (handle, created) = self
            .shared
            .cache
            .get_or_insert_with(&raw, || ProxyHandle::new(raw.clone(), self.clone()));
        if created {
            tracing::debug!(
                policy = %self.shared.policy.name(),
                target = %raw.type_name(),
                cached = self.shared.cache.len(),
                "wrapped object"
            );
        }
        handle
    }

    pub fn ptr_eq(&self, other: &ProxyRoot) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl fmt::Debug for ProxyRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyRoot")
            .field("policy", &self.shared.policy.name())
            .field("cached", &self.shared.cache.len())
            .finish()
    }
}

/// Free-function form of `ProxyRoot::wrap`.
pub fn wrap(value: Value, root: &ProxyRoot) -> Value {
    root.wrap(value)
}

/// Capability query: is `value` a filtered reference?
pub fn filters_forbidden_methods(value: &Value) -> bool {
    value.filters_forbidden_methods()
}
