//! Harness config loader (strict parsing).

pub mod schema;

use std::fs;

use stepguard_core::error::{Result, StepGuardError};

pub use schema::{HarnessConfig, PolicyConfig, Preset};

pub fn load_from_file(path: &str) -> Result<HarnessConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| StepGuardError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<HarnessConfig> {
    let cfg: HarnessConfig = serde_yaml::from_str(s)
        .map_err(|e| StepGuardError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
