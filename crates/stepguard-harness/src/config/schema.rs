use std::collections::HashSet;

use serde::Deserialize;
use stepguard_core::error::{Result, StepGuardError};
use stepguard_core::ForbiddenMethodSet;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    pub version: u32,

    #[serde(default)]
    pub policies: Vec<PolicyConfig>,
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(StepGuardError::UnsupportedVersion);
        }
        if self.policies.is_empty() {
            return Err(StepGuardError::Config("policies must not be empty".into()));
        }

        // `extends` may only point backwards, which also rules out cycles.
        let mut seen: HashSet<&str> = HashSet::new();
        for p in &self.policies {
            p.validate()?;
            if let Some(parent) = &p.extends {
                if !seen.contains(parent.as_str()) {
                    return Err(StepGuardError::Config(format!(
                        "policy {} extends {parent}, which is not declared before it",
                        p.name
                    )));
                }
            }
            if !seen.insert(p.name.as_str()) {
                return Err(StepGuardError::Config(format!("duplicate policy name: {}", p.name)));
            }
        }

        Ok(())
    }
}

/// Built-in method families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    RspecExpectations,
}

impl Preset {
    pub fn build(self) -> ForbiddenMethodSet {
        match self {
            Preset::RspecExpectations => ForbiddenMethodSet::rspec_expectations(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    pub name: String,

    #[serde(default)]
    pub preset: Option<Preset>,

    #[serde(default)]
    pub forbidden_methods: Vec<String>,

    /// Name of an earlier policy whose methods are included.
    #[serde(default)]
    pub extends: Option<String>,
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(StepGuardError::Config("policy name must not be empty".into()));
        }
        if self.preset.is_none() && self.forbidden_methods.is_empty() && self.extends.is_none() {
            return Err(StepGuardError::Config(format!(
                "policy {} needs a preset, forbidden_methods, or extends",
                self.name
            )));
        }
        if self.extends.as_deref() == Some(self.name.as_str()) {
            return Err(StepGuardError::Config(format!("policy {} extends itself", self.name)));
        }
        Ok(())
    }
}
