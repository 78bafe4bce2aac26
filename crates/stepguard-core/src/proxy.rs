//! Proxy wrapper: the interception core.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::Result;
use crate::policy::{ForbiddenMethodSet, AS_RAW, FILTERS_FORBIDDEN_METHODS};
use crate::value::{CallCtx, Method, ObjectRef, Value};
use crate::wrap::ProxyRoot;

pub(crate) struct ProxyInner {
    raw: ObjectRef,
    root: ProxyRoot,
}

/// Filtered reference to a raw target.
///
/// Cloning shares the same handle; equality is handle identity. Obtain one
/// through `ProxyRoot::wrap` / `ProxyRoot::wrap_object`.
#[derive(Clone)]
pub struct ProxyHandle {
    inner: Arc<ProxyInner>,
}

impl ProxyHandle {
    pub(crate) fn new(raw: ObjectRef, root: ProxyRoot) -> Self {
        Self {
            inner: Arc::new(ProxyInner { raw, root }),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<ProxyInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(weak: &Weak<ProxyInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Invoke `method` through the filter.
    ///
    /// Forbidden names fail before the target is touched. Everything else is
    /// forwarded under a filtered `CallCtx`; the target's own errors come
    /// back unchanged and structured results are wrapped under this root.
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        match method {
            FILTERS_FORBIDDEN_METHODS => return Ok(Value::Bool(true)),
            AS_RAW => return Ok(Value::Object(self.as_raw())),
            _ => {}
        }

        let set = self.forbidden_set();
        set.check(method)?;

        tracing::trace!(
            policy = %set.name(),
            target = %self.inner.raw.type_name(),
            method,
            "forwarding"
        );
        let ctx = CallCtx::filtered(set);
        let result = self.inner.raw.invoke(&ctx, Method::checked(method), args)?;
        Ok(self.inner.root.wrap(result))
    }

    /// Escape hatch: the exact raw reference, unfiltered.
    pub fn as_raw(&self) -> ObjectRef {
        tracing::debug!(
            policy = %self.forbidden_set().name(),
            target = %self.inner.raw.type_name(),
            "raw reference handed out"
        );
        self.inner.raw.clone()
    }

    /// Identity key of the wrapped target.
    pub fn raw_id(&self) -> usize {
        self.inner.raw.id()
    }

    pub fn target_type_name(&self) -> &str {
        self.inner.raw.type_name()
    }

    pub fn forbidden_set(&self) -> &Arc<ForbiddenMethodSet> {
        self.inner.root.forbidden_set()
    }

    pub fn root(&self) -> &ProxyRoot {
        &self.inner.root
    }

    pub fn ptr_eq(&self, other: &ProxyHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn wraps(&self, raw: &ObjectRef) -> bool {
        self.inner.raw.ptr_eq(raw)
    }
}

impl PartialEq for ProxyHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ProxyHandle {}

impl fmt::Debug for ProxyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyHandle")
            .field("target", &self.inner.raw)
            .field("policy", &self.forbidden_set().name())
            .finish()
    }
}

/// Free-function form of `ProxyHandle::as_raw`.
pub fn as_raw(proxy: &ProxyHandle) -> ObjectRef {
    proxy.as_raw()
}
