//! Errors the resolver can raise while assembling a response. Most outcomes
//! are ordinary RCODEs returned in-band (see `error::ResponseOutcome`); this
//! type is reserved for conditions the caller must react to directly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("wire-format error while assembling a response: {0}")]
    Proto(#[from] nsd_proto::ProtoError),

    #[error("internal invariant violated: {0}")]
    Invariant(&'static str),
}

pub type ResolverResult<T> = Result<T, ResolverError>;
