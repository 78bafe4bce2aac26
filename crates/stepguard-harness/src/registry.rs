//! Compiled policy registry.
//!
//! Built once at startup from `HarnessConfig`; every scenario created from it
//! shares the compiled `ForbiddenMethodSet` of its policy by `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use stepguard_core::error::{Result, StepGuardError};
use stepguard_core::ForbiddenMethodSet;

use crate::config::{HarnessConfig, PolicyConfig};
use crate::scenario::Scenario;

pub struct PolicyRegistry {
    policies: HashMap<String, Arc<ForbiddenMethodSet>>,
    order: Vec<String>,
}

impl PolicyRegistry {
    /// Compile every policy in declaration order.
    pub fn from_config(cfg: &HarnessConfig) -> Result<Self> {
        let mut policies = HashMap::new();
        let mut order = Vec::with_capacity(cfg.policies.len());

        for pc in &cfg.policies {
            let set = compile_policy(pc, &policies).map_err(|e| {
                StepGuardError::InvalidPolicy(format!(
                    "policy compile failed (policy={}): {e}",
                    pc.name
                ))
            })?;

            tracing::debug!(policy = %pc.name, methods = set.len(), "policy compiled");
            policies.insert(pc.name.clone(), Arc::new(set));
            order.push(pc.name.clone());
        }

        Ok(Self { policies, order })
    }

    pub fn policy(&self, name: &str) -> Option<Arc<ForbiddenMethodSet>> {
        self.policies.get(name).cloned()
    }

    /// Policy names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Start a scenario filtered by the named policy.
    pub fn scenario(&self, scenario: impl Into<String>, policy: &str) -> Result<Scenario> {
        let set = self
            .policy(policy)
            .ok_or_else(|| StepGuardError::Config(format!("unknown policy: {policy}")))?;
        Ok(Scenario::new(scenario, set))
    }
}

fn compile_policy(
    pc: &PolicyConfig,
    compiled: &HashMap<String, Arc<ForbiddenMethodSet>>,
) -> Result<ForbiddenMethodSet> {
    let mut parts: Vec<ForbiddenMethodSet> = Vec::new();

    if let Some(preset) = pc.preset {
        parts.push(preset.build());
    }
    if !pc.forbidden_methods.is_empty() {
        parts.push(ForbiddenMethodSet::new(&pc.name, pc.forbidden_methods.iter().cloned())?);
    }

    let parent = match &pc.extends {
        Some(name) => Some(
            compiled
                .get(name)
                .ok_or_else(|| StepGuardError::Config(format!("unknown parent policy: {name}")))?,
        ),
        None => None,
    };

    let mut own = parts.into_iter();
    let set = match (own.next(), parent) {
        (Some(first), parent) => {
            let mut acc = own.fold(first.renamed(&pc.name), |acc, p| acc.union(&pc.name, &p));
            if let Some(parent) = parent {
                if acc.difference(parent).next().is_none() {
                    tracing::warn!(policy = %pc.name, parent = %parent.name(), "policy adds nothing to its parent");
                }
                acc = acc.union(&pc.name, parent);
            }
            acc
        }
        (None, Some(parent)) => (**parent).clone().renamed(&pc.name),
        (None, None) => {
            return Err(StepGuardError::InvalidPolicy(format!(
                "policy {} forbids nothing",
                pc.name
            )))
        }
    };

    Ok(set)
}
