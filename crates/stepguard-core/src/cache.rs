use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use std::sync::Weak;

use crate::proxy::{ProxyHandle, ProxyInner};
use crate::value::ObjectRef;

/// Identity cache: `raw id -> proxy`, scoped to one root.
///
/// Entries are weak: the cache never keeps a proxy alive. A live entry always
/// points at the same raw allocation as its key, since the proxy holds the raw
/// object and its address cannot be reused while it lives.
#[derive(Default)]
pub struct IdentityCache {
    entries: DashMap<usize, Weak<ProxyInner>>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, raw: &ObjectRef) -> Option<ProxyHandle> {
        let entry = self.entries.get(&raw.id())?;
        let handle = ProxyHandle::upgrade(entry.value())?;
        handle.wraps(raw).then_some(handle)
    }

    /// Return the live proxy for `raw`, or register the one built by `make`.
    /// The bool is true when a new entry was written.
    pub fn get_or_insert_with<F>(&self, raw: &ObjectRef, make: F) -> (ProxyHandle, bool)
    where
        F: FnOnce() -> ProxyHandle,
    {
        match self.entries.entry(raw.id()) {
            Entry::Occupied(mut e) => {
                if let Some(live) = ProxyHandle::upgrade(e.get()) {
                    if live.wraps(raw) {
                        return (live, false);
                    }
                }
                // Dead entry left behind by a dropped proxy.
                let handle = make();
                e.insert(handle.downgrade());
                (handle, true)
            }
            Entry::Vacant(e) => {
                let handle = make();
                e.insert(handle.downgrade());
                (handle, true)
            }
        }
    }

    /// Number of entries, live or dead.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose proxy is still referenced somewhere.
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|e| e.value().strong_count() > 0).count()
    }

    /// Drop entries whose proxy is gone. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, w| w.strong_count() > 0);
        before.saturating_sub(self.entries.len())
    }
}
