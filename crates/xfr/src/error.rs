//! Errors the XFR coordinator can raise. Per `spec.md` section 7's
//! propagation policy, almost none of these kill the process — the state
//! machine instead advances the master/round cursor and keeps going; this
//! type exists for the handful of calls (TSIG key setup, difflog I/O) where
//! the caller genuinely needs to react.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XfrError {
    #[error("wire-format error while handling a transfer: {0}")]
    Proto(#[from] nsd_proto::ProtoError),

    #[error("TSIG verification failed on a transfer reply")]
    TsigFailed,

    #[error("difflog sink rejected a record: {0}")]
    DiffLog(String),

    #[error("no master is configured for this zone")]
    NoMasters,
}

pub type XfrResult<T> = Result<T, XfrError>;
