//! The taxonomy this crate's own entry points (`ZoneLoader`, the control
//! channel) can fail with, each wrapping the lower-layer error it came
//! from so `?` propagation naturally produces the outcome table callers
//! need.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Database(#[from] nsd_database::DatabaseError),

    #[error(transparent)]
    Xfr(#[from] nsd_xfr::XfrError),

    #[error(transparent)]
    Ipc(#[from] nsd_ipc::IpcError),

    #[error("malformed control-channel command: {0}")]
    BadCommand(String),

    #[error("unknown zone {0}")]
    UnknownZone(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
