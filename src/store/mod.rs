//! Cache storage for request/response pairs.
//!
//! This module provides the `CacheStore` abstraction the router writes
//! through: named, versioned namespaces holding responses keyed by
//! request method + URL. Two implementations exist:
//!
//! - `MemoryStore`: in-process map, used in tests and short-lived routers
//! - `DiskStore`: one JSON file per namespace, used by the debug console

pub mod disk;
pub mod memory;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use disk::DiskStore;
pub use memory::MemoryStore;

/// HTTP request method. Only `Get` requests are ever cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }

    pub fn is_get(&self) -> bool {
        matches!(self, Method::Get)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request descriptor as seen by the router: method plus URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Cache key for this request. Namespace entries are keyed by
    /// method + URL so a GET and a HEAD of the same URL never collide.
    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }

    /// Path component of the URL (query string included), used for route
    /// classification. Absolute URLs are reduced to everything after the
    /// authority; relative URLs pass through unchanged.
    pub fn path(&self) -> &str {
        let url = self.url.as_str();
        if let Some(rest) = url.split_once("://").map(|(_, r)| r) {
            match rest.find('/') {
                Some(idx) => &rest[idx..],
                None => "/",
            }
        } else {
            url
        }
    }
}

/// A stored response: the idempotent representation of a resource.
/// Entries are overwritten in place on refetch (last writer wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub cached_at: DateTime<Utc>,
}

impl CachedResponse {
    pub fn new(status: u16, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            body,
            cached_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8 text, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }
}

/// Keyed response storage with explicit namespaces.
///
/// The router never assumes anything about the backing medium; tests use
/// `MemoryStore` and the console uses `DiskStore`. Mutation is plain
/// overwrite keyed by request identity, so no coordination is needed
/// beyond what each implementation does internally.
pub trait CacheStore: Send + Sync {
    /// Look up an entry, `None` when the namespace or key is absent.
    fn get(&self, namespace: &str, key: &str) -> Result<Option<CachedResponse>>;

    /// Insert or overwrite an entry, creating the namespace on first write.
    fn put(&self, namespace: &str, key: &str, response: &CachedResponse) -> Result<()>;

    /// Names of all namespaces that currently exist.
    fn namespaces(&self) -> Result<Vec<String>>;

    /// Delete a namespace and everything in it. Deleting a namespace that
    /// does not exist is not an error.
    fn remove_namespace(&self, namespace: &str) -> Result<()>;
}
