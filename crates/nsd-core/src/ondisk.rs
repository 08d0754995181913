//! Plain, `serde`-derived data structs for the on-disk database and
//! difflog formats `spec.md` section 6 names. Writing or reading the
//! actual file is out of scope (the file-I/O and wire layout are an
//! embedder's job); these structs exist so an embedder has a typed shape
//! to serialize into whatever format it chooses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnDiskHeader {
    pub format_version: u32,
    pub zone_count: u32,
    pub generated_at_unix: u64,
}

/// One record as it would be appended to a difflog: a delete or an add,
/// named by zone and owner, with the RDATA kept as opaque wire bytes
/// rather than re-deriving a type-specific encoding here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffLogRecord {
    pub zone: String,
    pub owner: String,
    pub record_type: u16,
    pub dns_class: u16,
    pub ttl: u32,
    pub rdata: Vec<u8>,
    pub is_delete: bool,
}

/// One committed transfer, in the on-disk shape: the new serial and the
/// flat sequence of records that made up the change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffLogEntry {
    pub new_serial: u32,
    pub records: Vec<DiffLogRecord>,
}
