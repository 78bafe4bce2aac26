//! stepguard-check: validate a policy config and list what each policy forbids.
//!
//! Usage: `stepguard-check [path]` (default `stepguard.yaml`).

use std::process::ExitCode;

use stepguard_harness::{config, obs, PolicyRegistry};

fn main() -> ExitCode {
    obs::init_logging();

    let path = std::env::args().nth(1).unwrap_or_else(|| "stepguard.yaml".to_string());

    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(%path, code = e.code().as_str(), "config load failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let registry = match PolicyRegistry::from_config(&cfg) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(%path, code = e.code().as_str(), "{e}");
            return ExitCode::FAILURE;
        }
    };

    for name in registry.names() {
        if let Some(set) = registry.policy(name) {
            let methods: Vec<&str> = set.iter().collect();
            tracing::info!(policy = %name, ?methods, "policy ok");
            println!("{name}: {}", methods.join(", "));
        }
    }

    ExitCode::SUCCESS
}
