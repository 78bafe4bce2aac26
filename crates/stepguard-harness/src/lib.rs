//! stepguard harness library entry.
//!
//! Host-side integration of the proxy core: strict YAML policy config, a
//! registry of compiled policies, and per-scenario scopes that hand driver
//! objects to step code only in wrapped form.

pub mod config;
pub mod obs;
pub mod registry;
pub mod scenario;

pub use registry::PolicyRegistry;
pub use scenario::Scenario;
