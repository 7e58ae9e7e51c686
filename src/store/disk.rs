use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use super::{CacheStore, CachedResponse};

/// On-disk cache store: one JSON file per namespace.
///
/// Whole-namespace read/write keeps the format transparent and easy to
/// inspect while debugging. Entry counts here are small (a precache
/// manifest plus opportunistically cached pages), so rewriting the file
/// per insert is fine.
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache directory: {}", root.display()))?;
        Ok(Self { root })
    }

    fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.root.join(format!("{}.json", namespace))
    }

    fn load_namespace(&self, namespace: &str) -> Result<HashMap<String, CachedResponse>> {
        let path = self.namespace_path(namespace);
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache namespace: {}", namespace))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache namespace: {}", namespace))
    }

    fn save_namespace(
        &self,
        namespace: &str,
        entries: &HashMap<String, CachedResponse>,
    ) -> Result<()> {
        let path = self.namespace_path(namespace);
        let contents = serde_json::to_string(entries)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write cache namespace: {}", namespace))?;
        Ok(())
    }
}

impl CacheStore for DiskStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<CachedResponse>> {
        Ok(self.load_namespace(namespace)?.remove(key))
    }

    fn put(&self, namespace: &str, key: &str, response: &CachedResponse) -> Result<()> {
        let mut entries = self.load_namespace(namespace)?;
        entries.insert(key.to_string(), response.clone());
        self.save_namespace(namespace, &entries)?;
        debug!(namespace, key, "Cached response written");
        Ok(())
    }

    fn namespaces(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)
            .with_context(|| format!("Failed to list cache directory: {}", self.root.display()))?
        {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        Ok(names)
    }

    fn remove_namespace(&self, namespace: &str) -> Result<()> {
        let path = self.namespace_path(namespace);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to delete cache namespace: {}", namespace))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path().to_path_buf()).unwrap();

        let entry = CachedResponse::new(200, Some("text/html".into()), b"<html>".to_vec());
        store.put("todobox-v2", "GET /undone", &entry).unwrap();

        let loaded = store.get("todobox-v2", "GET /undone").unwrap().unwrap();
        assert_eq!(loaded.status, 200);
        assert_eq!(loaded.content_type.as_deref(), Some("text/html"));
        assert_eq!(loaded.body, b"<html>");
    }

    #[test]
    fn test_namespaces_listed_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path().to_path_buf()).unwrap();
        let entry = CachedResponse::new(200, None, Vec::new());

        store.put("todobox-v1", "GET /", &entry).unwrap();
        store.put("todobox-static-v2", "GET /", &entry).unwrap();

        let mut names = store.namespaces().unwrap();
        names.sort();
        assert_eq!(names, vec!["todobox-static-v2", "todobox-v1"]);

        store.remove_namespace("todobox-v1").unwrap();
        assert_eq!(store.namespaces().unwrap(), vec!["todobox-static-v2"]);
    }

    #[test]
    fn test_missing_namespace_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path().to_path_buf()).unwrap();
        assert!(store.get("todobox-v2", "GET /").unwrap().is_none());
    }
}
