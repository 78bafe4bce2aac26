//! Logging setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the fmt subscriber filtered by `RUST_LOG`. A second call is a no-op,
/// so every test may call it.
pub fn init_logging() {
    let _ = fmt().with_env_filter(EnvFilter::from_default_env()).try_init();
}
