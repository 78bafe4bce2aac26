//! Dynamic values crossing the proxy boundary.
//!
//! Targets of unknown shape are reached through one invoke-by-name entry point
//! (`Invoke`). Every call carries a `CallCtx` telling the target whether it is
//! running on behalf of a proxy, so nested calls made while servicing a
//! forwarded call are filtered too.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{Result, StepGuardError};
use crate::policy::{ForbiddenMethodSet, FILTERS_FORBIDDEN_METHODS};
use crate::proxy::ProxyHandle;

/// Invoke-by-name surface implemented once per target type.
pub trait Invoke: Send + Sync {
    /// Human-readable type name, used in errors and logs.
    fn type_name(&self) -> &str;

    /// Execute `method`, a name that already passed the filter of `ctx`.
    ///
    /// A bare `&str` is not a `Method`, so a self-call has to go through
    /// `ctx.send_self` (and a call on another value through `ctx.send`),
    /// which check the name first.
    fn invoke(&self, ctx: &CallCtx<'_>, method: Method<'_>, args: &[Value]) -> Result<Value>;
}

/// Method name that has been checked against the call context in force.
///
/// Only `CallCtx` and the proxy build one, after running the check:
///
/// ```compile_fail
/// use stepguard_core::{CallCtx, Invoke, Method, Result, Value};
///
/// struct SelfCaller;
///
/// impl Invoke for SelfCaller {
///     fn type_name(&self) -> &str {
///         "SelfCaller"
///     }
///
///     fn invoke(&self, ctx: &CallCtx<'_>, _method: Method<'_>, args: &[Value]) -> Result<Value> {
///         self.invoke(ctx, "assert_equal", args)
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Method<'a> {
    name: &'a str,
}

impl<'a> Method<'a> {
    pub(crate) fn checked(name: &'a str) -> Self {
        Self { name }
    }

    pub fn as_str(&self) -> &'a str {
        self.name
    }
}

impl std::ops::Deref for Method<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        self.name
    }
}

impl fmt::Display for Method<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Shared reference to a raw target. Identity is the address of the shared
/// allocation; cloning never copies the object.
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn Invoke>);

impl ObjectRef {
    pub fn new<T: Invoke + 'static>(obj: T) -> Self {
        Self(Arc::new(obj))
    }

    /// Adopt an existing `Arc`, keeping its identity.
    pub fn from_arc<T: Invoke + 'static>(obj: Arc<T>) -> Self {
        Self(obj)
    }

    /// Identity key (allocation address).
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        self.id() == other.id()
    }

    pub fn type_name(&self) -> &str {
        self.0.type_name()
    }

    pub(crate) fn invoke(&self, ctx: &CallCtx<'_>, method: Method<'_>, args: &[Value]) -> Result<Value> {
        self.0.invoke(ctx, method, args)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({}@{:#x})", self.type_name(), self.id())
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

/// A value returned from or passed into an invocation.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    Bytes(Bytes),
    /// Raw structured target.
    Object(ObjectRef),
    /// Filtered reference produced by a `ProxyRoot`.
    Proxy(ProxyHandle),
}

impl Value {
    pub fn object<T: Invoke + 'static>(obj: T) -> Self {
        Value::Object(ObjectRef::new(obj))
    }

    pub fn symbol(s: impl Into<String>) -> Self {
        Value::Symbol(s.into())
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Symbol(_) => "symbol",
            Value::Bytes(_) => "bytes",
            Value::Object(o) => o.type_name(),
            Value::Proxy(p) => p.target_type_name(),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Symbol(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_proxy(&self) -> Option<&ProxyHandle> {
        match self {
            Value::Proxy(p) => Some(p),
            _ => None,
        }
    }

    /// Capability query: true only for values produced by a `ProxyRoot`.
    pub fn filters_forbidden_methods(&self) -> bool {
        matches!(self, Value::Proxy(_))
    }

    /// Call `method` directly. Raw targets run unfiltered; proxies apply
    /// their own policy.
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        CallCtx::direct().send(self, method, args)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Proxy(a), Value::Proxy(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

impl From<ProxyHandle> for Value {
    fn from(v: ProxyHandle) -> Self {
        Value::Proxy(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

/// Dispatch context of one invocation.
///
/// `filtered` while a proxy is forwarding: every nested `send` checks the
/// set in force before reaching its receiver.
#[derive(Debug, Clone, Copy)]
pub struct CallCtx<'a> {
    forbidden: Option<&'a ForbiddenMethodSet>,
}

impl CallCtx<'static> {
    /// Unfiltered context for calls made on raw values.
    pub fn direct() -> Self {
        Self { forbidden: None }
    }
}

impl<'a> CallCtx<'a> {
    pub fn filtered(set: &'a ForbiddenMethodSet) -> Self {
        Self {
            forbidden: Some(set),
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.forbidden.is_some()
    }

    pub fn forbidden_set(&self) -> Option<&'a ForbiddenMethodSet> {
        self.forbidden
    }

    /// Nested call on any receiver.
    pub fn send(&self, target: &Value, method: &str, args: &[Value]) -> Result<Value> {
        // Answered from the variant alone, never by the receiver.
        if method == FILTERS_FORBIDDEN_METHODS {
            return Ok(Value::Bool(target.filters_forbidden_methods()));
        }
        self.check(method)?;
        match target {
            Value::Object(o) => o.invoke(self, Method::checked(method), args),
            Value::Proxy(p) => p.call(method, args),
            other => Err(StepGuardError::no_method(other.type_name(), method)),
        }
    }

    /// Nested call on the receiver currently executing.
    pub fn send_self(&self, this: &dyn Invoke, method: &str, args: &[Value]) -> Result<Value> {
        if method == FILTERS_FORBIDDEN_METHODS {
            return Ok(Value::Bool(false));
        }
        self.check(method)?;
        this.invoke(self, Method::checked(method), args)
    }

    fn check(&self, method: &str) -> Result<()> {
        match self.forbidden {
            Some(set) => set.check(method),
            None => Ok(()),
        }
    }
}
