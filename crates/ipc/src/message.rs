//! The three request shapes the XFR coordinator sends a serving worker,
//! and the replies it gets back.

use nsd_proto::rr::rdata::Soa;
use nsd_proto::rr::Name;

#[derive(Debug, Clone)]
pub enum Request {
    /// A zone was added to the running configuration (e.g. by the control
    /// channel); the worker should start serving it once its first SOA is
    /// loaded.
    ZoneAdd { zone: Name },
    /// A committed transfer is ready; the worker should swap in the new
    /// snapshot for `zone`.
    Reload { zone: Name },
    /// Asks the worker which serial it is currently serving for `zone`.
    SoaEcho { zone: Name },
}

#[derive(Debug, Clone)]
pub enum Reply {
    Ack,
    Soa(Option<Soa>),
    Error(String),
}

impl Request {
    pub fn zone(&self) -> &Name {
        match self {
            Request::ZoneAdd { zone } | Request::Reload { zone } | Request::SoaEcho { zone } => zone,
        }
    }
}
