//! The in-memory domain-name database: an ordered tree of domain names,
//! per-zone RRset storage, and NSEC3 cover/exact precomputation.
//!
//! Built from `nsd-proto` types; has no knowledge of the network or the
//! query/XFR protocols layered on top of it in `nsd-resolver`/`nsd-xfr`.

pub mod domain;
pub mod error;
pub mod ndb;
pub mod nsec3;
pub mod radix;
pub mod region;
pub mod rrset;
pub mod zone;

pub use domain::{Domain, DomainId};
pub use error::{DatabaseError, DatabaseResult};
pub use ndb::{Lookup, Ndb};
pub use region::{Region, RegionId};
pub use rrset::Rrset;
pub use zone::{Zone, ZoneId};
