//! The request cache router.
//!
//! This module is the offline heart of the crate: it owns the two
//! versioned cache namespaces (static precache and dynamic), classifies
//! each request through the route table, and answers it cache-first,
//! network-first, or bypass accordingly.
//!
//! Lifecycle mirrors a service worker's:
//! - `install` populates the static namespace from the precache manifest,
//!   all-or-nothing
//! - `activate` deletes every namespace that is not one of the two
//!   current names (version rollover)
//! - `handle` dispatches individual requests
//!
//! The network side is behind the `Origin` trait so the dispatch logic is
//! testable with a scripted origin and an in-memory store.

pub mod dispatch;
pub mod error;
pub mod origin;

pub use dispatch::{CacheRouter, RoutedResponse, ServedFrom};
pub use error::FetchError;
pub use origin::{FetchedResponse, HttpOrigin, Origin};
