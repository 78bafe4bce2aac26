//! Shared error type across stepguard crates.

use thiserror::Error;

/// Stable error codes, safe to match on from test harnesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A forbidden method was called through a wrapped reference.
    ForbiddenMethod,
    /// The receiver does not respond to the method.
    NoMethod,
    /// The target object failed on its own.
    Target,
    /// A forbidden-method set could not be built.
    InvalidPolicy,
    /// No driver registered under the requested name.
    UnknownDriver,
    /// Malformed configuration.
    Config,
    /// Unsupported configuration version.
    UnsupportedVersion,
}

impl ErrorCode {
    /// String representation used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ForbiddenMethod => "FORBIDDEN_METHOD",
            ErrorCode::NoMethod => "NO_METHOD",
            ErrorCode::Target => "TARGET",
            ErrorCode::InvalidPolicy => "INVALID_POLICY",
            ErrorCode::UnknownDriver => "UNKNOWN_DRIVER",
            ErrorCode::Config => "CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, StepGuardError>;

/// Unified error type used by core and harness.
///
/// Only `ForbiddenMethodInvoked` is raised by the proxy itself. `NoMethod` and
/// `Target` belong to target objects and travel through the proxy untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepGuardError {
    #[error("forbidden method invoked through proxy: {0}")]
    ForbiddenMethodInvoked(String),
    #[error("undefined method `{method}` for {receiver}")]
    NoMethod { receiver: String, method: String },
    #[error("target failed: {0}")]
    Target(String),
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
    #[error("unknown driver: {0}")]
    UnknownDriver(String),
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
}

impl StepGuardError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            StepGuardError::ForbiddenMethodInvoked(_) => ErrorCode::ForbiddenMethod,
            StepGuardError::NoMethod { .. } => ErrorCode::NoMethod,
            StepGuardError::Target(_) => ErrorCode::Target,
            StepGuardError::InvalidPolicy(_) => ErrorCode::InvalidPolicy,
            StepGuardError::UnknownDriver(_) => ErrorCode::UnknownDriver,
            StepGuardError::Config(_) => ErrorCode::Config,
            StepGuardError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
        }
    }

    /// Shorthand for a target reporting that it does not know `method`.
    pub fn no_method(receiver: impl Into<String>, method: impl Into<String>) -> Self {
        StepGuardError::NoMethod {
            receiver: receiver.into(),
            method: method.into(),
        }
    }
}
