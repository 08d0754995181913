//! Turns a parsed query plus an `nsd_database::Ndb` snapshot into an
//! authoritative response.
//!
//! This crate has no knowledge of sockets or zone transfer; it answers one
//! query against one already-loaded database and returns the `Message` to
//! send back, or `None` when the request must be dropped silently.

pub mod answer;
pub mod classify;
pub mod config;
pub mod error;
pub mod nsec3_proof;
pub mod resolve;

pub use config::{ResolverConfig, Transport};
pub use error::{ResolverError, ResolverResult};
pub use resolve::Resolver;
