//! Offline configuration management.
//!
//! This module handles loading and saving the offline configuration:
//! the server base URL, the cache namespace version, the precache
//! manifest, and the route exclusion list.
//!
//! Configuration is stored at `~/.config/todobox-offline/config.json`.
//! Bumping `cache_version` is the sole mechanism for invalidating the
//! caches across deploys: the next activation prunes every namespace
//! carrying the old version.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::policy::{RouteTable, DEFAULT_BYPASS, DEFAULT_STATIC_MARKER};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "todobox-offline";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineConfig {
    pub base_url: String,
    pub cache_prefix: String,
    pub cache_version: String,
    /// Assets cached verbatim at install time, all-or-nothing.
    pub precache: Vec<String>,
    /// Route substrings that bypass the static cache entirely.
    pub bypass: Vec<String>,
    /// Path prefix for cache-first static assets.
    pub static_marker: String,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            cache_prefix: "todobox".to_string(),
            cache_version: "v2".to_string(),
            precache: vec![
                "/".to_string(),
                "/dashboard".to_string(),
                "/static/manifest.json".to_string(),
                "/static/assets/icons/icon-192x192.png".to_string(),
                "/static/assets/icons/icon-256x256.png".to_string(),
                "/static/assets/icons/icon-384x384.png".to_string(),
                "/static/assets/icons/icon-512x512.png".to_string(),
            ],
            bypass: DEFAULT_BYPASS.iter().map(|s| s.to_string()).collect(),
            static_marker: DEFAULT_STATIC_MARKER.to_string(),
        }
    }
}

impl OfflineConfig {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Name of the precache namespace, e.g. `todobox-static-v2`.
    pub fn static_cache_name(&self) -> String {
        format!("{}-static-{}", self.cache_prefix, self.cache_version)
    }

    /// Name of the dynamic namespace, e.g. `todobox-v2`.
    pub fn dynamic_cache_name(&self) -> String {
        format!("{}-{}", self.cache_prefix, self.cache_version)
    }

    /// The route table built from the configured lists.
    pub fn route_table(&self) -> RouteTable {
        RouteTable::from_lists(&self.bypass, &self.static_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::RoutePolicy;

    #[test]
    fn test_namespace_names_follow_version() {
        let config = OfflineConfig::default();
        assert_eq!(config.static_cache_name(), "todobox-static-v2");
        assert_eq!(config.dynamic_cache_name(), "todobox-v2");

        let mut bumped = config;
        bumped.cache_version = "v3".to_string();
        assert_eq!(bumped.static_cache_name(), "todobox-static-v3");
        assert_eq!(bumped.dynamic_cache_name(), "todobox-v3");
    }

    #[test]
    fn test_default_route_table_matches_policy_defaults() {
        let table = OfflineConfig::default().route_table();
        assert_eq!(table.classify("/login"), RoutePolicy::Bypass);
        assert_eq!(table.classify("/static/app.css"), RoutePolicy::CacheFirst);
        assert_eq!(table.classify("/undone"), RoutePolicy::NetworkFirst);
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = OfflineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: OfflineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.precache, config.precache);
        assert_eq!(parsed.bypass, config.bypass);
    }
}
