use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};

use super::{CacheStore, CachedResponse};

type NamespaceMap = HashMap<String, HashMap<String, CachedResponse>>;

/// In-process cache store backed by a locked map.
///
/// Namespaces spring into existence on first write. Suitable for tests and
/// for routers whose cache does not need to outlive the process.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<NamespaceMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a namespace, zero when absent.
    pub fn entry_count(&self, namespace: &str) -> usize {
        self.inner
            .read()
            .map(|map| map.get(namespace).map_or(0, |ns| ns.len()))
            .unwrap_or(0)
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<CachedResponse>> {
        let map = self
            .inner
            .read()
            .map_err(|_| anyhow!("cache lock poisoned"))?;
        Ok(map.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    fn put(&self, namespace: &str, key: &str, response: &CachedResponse) -> Result<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| anyhow!("cache lock poisoned"))?;
        map.entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), response.clone());
        Ok(())
    }

    fn namespaces(&self) -> Result<Vec<String>> {
        let map = self
            .inner
            .read()
            .map_err(|_| anyhow!("cache lock poisoned"))?;
        Ok(map.keys().cloned().collect())
    }

    fn remove_namespace(&self, namespace: &str) -> Result<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| anyhow!("cache lock poisoned"))?;
        map.remove(namespace);
        Ok(())
    }
}
