//! stepguard core: the call-interception proxy.
//!
//! Step code handed a wrapped driver object cannot run assertion-style methods
//! through it. Forbidden names fail with `ForbiddenMethodInvoked` before the
//! target is touched; everything else is forwarded, and structured results
//! come back wrapped under the same policy.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible paths
//! surface as `StepGuardError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod cache;
pub mod error;
pub mod policy;
pub mod proxy;
pub mod value;
pub mod wrap;

/// Shared result type.
pub use error::{ErrorCode, Result, StepGuardError};
pub use cache::IdentityCache;
pub use policy::{ForbiddenMethodSet, AS_RAW, FILTERS_FORBIDDEN_METHODS, RESERVED_METHODS};
pub use proxy::{as_raw, ProxyHandle};
pub use value::{CallCtx, Invoke, Method, ObjectRef, Value};
pub use wrap::{classify, filters_forbidden_methods, wrap, ProxyRoot, WrapClass};
