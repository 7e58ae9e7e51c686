//! Offline shell for the TodoBox web app.
//!
//! TodoBox pages keep working without a network because every request is
//! answered through a cache router with two versioned namespaces: a
//! static precache populated at install time and a dynamic namespace
//! populated opportunistically from successful responses. An ordered
//! route table decides, per request, between three policies:
//!
//! - bypass: authenticated and account routes, never answered from the
//!   static cache
//! - cache-first: static assets under `/static/`
//! - network-first: everything else, with the last good copy as the
//!   offline fallback
//!
//! The crate also carries the `TodoClient` the pages drive for todo
//! actions (edit fetch, save, done, KIV, delete), each sending the CSRF
//! token the way the server expects.

pub mod api;
pub mod config;
pub mod models;
pub mod policy;
pub mod router;
pub mod store;

pub use api::{ApiError, TodoClient, KIV_REDIRECT};
pub use config::OfflineConfig;
pub use policy::{RoutePolicy, RouteRule, RouteTable};
pub use router::{CacheRouter, FetchError, HttpOrigin, Origin, RoutedResponse, ServedFrom};
pub use store::{CacheStore, CachedResponse, DiskStore, MemoryStore, Method, Request};
