//! Top-level facade crate for stepguard.
//!
//! Re-exports the proxy core and the harness so users can depend on a single crate.

pub mod core {
    pub use stepguard_core::*;
}

pub mod harness {
    pub use stepguard_harness::*;
}
