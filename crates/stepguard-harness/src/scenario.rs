use std::sync::Arc;

use dashmap::DashMap;

use stepguard_core::error::{Result, StepGuardError};
use stepguard_core::{ForbiddenMethodSet, ObjectRef, ProxyHandle, ProxyRoot, Value};

/// One test scenario's world:
/// - a fresh `ProxyRoot` (its identity cache dies with the scenario)
/// - `driver name -> proxy` for every driver handed to step code
pub struct Scenario {
    name: String,
    root: ProxyRoot,
    drivers: DashMap<String, ProxyHandle>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, policy: Arc<ForbiddenMethodSet>) -> Self {
        let name = name.into();
        tracing::debug!(scenario = %name, policy = %policy.name(), "scenario started");
        Self {
            name,
            root: ProxyRoot::with_policy(policy),
            drivers: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &ProxyRoot {
        &self.root
    }

    /// Register a driver. It is wrapped right away; step code never sees the
    /// raw object. Returns the raw driver previously registered under `name`.
    pub fn register_driver(&self, name: impl Into<String>, driver: ObjectRef) -> Option<ObjectRef> {
        let name = name.into();
        let proxy = self.root.wrap_object(driver);
        tracing::debug!(scenario = %self.name, driver = %name, target = %proxy.target_type_name(), "driver registered");
        self.drivers
            .insert(name, proxy)
            .map(|prev| prev.as_raw())
    }

    /// Driver as handed to step code: always wrapped, identical across calls.
    pub fn driver(&self, name: &str) -> Result<Value> {
        self.drivers
            .get(name)
            .map(|p| Value::Proxy(p.value().clone()))
            .ok_or_else(|| StepGuardError::UnknownDriver(name.to_string()))
    }

    /// Unfiltered driver, for trusted integration code only.
    pub fn raw_driver(&self, name: &str) -> Result<ObjectRef> {
        let proxy = self
            .drivers
            .get(name)
            .ok_or_else(|| StepGuardError::UnknownDriver(name.to_string()))?
            .value()
            .clone();
        Ok(proxy.as_raw())
    }

    pub fn driver_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.drivers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Place any value behind this scenario's filter.
    pub fn wrap(&self, value: Value) -> Value {
        self.root.wrap(value)
    }

    /// Proxies of this scenario still referenced somewhere.
    pub fn cached_proxies(&self) -> usize {
        self.root.cache().live_count()
    }
}

impl Drop for Scenario {
    fn drop(&mut self) {
        tracing::debug!(
            scenario = %self.name,
            drivers = self.drivers.len(),
            cached = self.root.cache().len(),
            "scenario finished"
        );
    }
}
