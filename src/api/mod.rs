//! Client for the TodoBox server endpoints.
//!
//! This module provides the `TodoClient` the pages drive: fetching a
//! todo's edit payload, saving a draft, and marking todos done, KIV, or
//! deleted. Every mutating request carries the CSRF token both as a form
//! field and as the `X-CSRFToken` header, the way the server expects.
//!
//! CSRF issuance and login are the server's business; the token and the
//! session cookie jar are inputs here.

pub mod client;
pub mod error;

pub use client::{TodoClient, KIV_REDIRECT};
pub use error::ApiError;
