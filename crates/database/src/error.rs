//! Errors the database layer can raise while loading or querying a zone.

use nsd_proto::rr::Name;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("zone {0} has no SOA record at its apex")]
    MissingSoa(Name),

    #[error("zone {0} already exists in this database")]
    DuplicateZone(Name),

    #[error("record owner {owner} is outside zone {zone}")]
    OutOfZone { owner: Name, zone: Name },

    #[error("wire-format error while loading zone data: {0}")]
    Proto(#[from] nsd_proto::ProtoError),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
