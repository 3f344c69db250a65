//! Client-side view of the profile backend.
//!
//! Strictly derived state: [`api::ProfileApi`] talks to the HTTP API and
//! [`cache::ProfileCache`] keeps an advisory local copy that is overwritten
//! on every successful server response and cleared when the server confirms
//! deletion. The cache is never treated as authoritative.

pub mod api;
pub mod cache;
pub mod types;

pub use api::ProfileApi;
pub use cache::ProfileCache;
pub use types::{ApiResponse, FieldError, Profile};
