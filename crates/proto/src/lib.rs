//! Foundational DNS wire-protocol types for the authoritative core:
//! canonical names, resource records, messages, EDNS(0), TSIG, and the
//! NSEC3 iterated-hash primitive.
//!
//! This crate has no knowledge of zones, storage, or the network; it is the
//! DNAME/wire-format layer that `nsd-database`, `nsd-resolver` and
//! `nsd-xfr` all build on.

pub mod error;
pub mod nsec3;
pub mod op;
pub mod rr;
pub mod serial;
pub mod serialize;
pub mod tsig;

pub use error::{ProtoError, ProtoResult};
pub use serial::Serial;
