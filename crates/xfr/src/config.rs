//! Per-zone XFR configuration and the timing constants `spec.md` section
//! 4.4 names directly (`TRANSFER_TIMEOUT`, `MAX_ROUNDS`, `TSIG_MAX_UNSIGNED`,
//! `NOTIFY_MAX_NUM`, `NOTIFY_RETRY_TIMEOUT`).

use std::net::SocketAddr;
use std::time::Duration;

use nsd_proto::rr::Name;
use nsd_proto::tsig::TsigAlgorithm;

/// A configured upstream master, with the TSIG key to sign/verify the
/// exchange if the master requires one.
#[derive(Clone, Debug)]
pub struct Master {
    pub address: SocketAddr,
    pub tsig: Option<TsigKey>,
    /// True if this master only ever serves full transfers (e.g. it is
    /// known not to support IXFR).
    pub axfr_only: bool,
}

#[derive(Clone, Debug)]
pub struct TsigKey {
    pub name: Name,
    pub algorithm: TsigAlgorithm,
    pub secret: Vec<u8>,
}

/// A downstream server to NOTIFY on zone update.
#[derive(Clone, Debug)]
pub struct NotifyTarget {
    pub address: SocketAddr,
}

/// One zone's worth of transfer configuration: its masters (tried in
/// order, cycling on failure) and its outgoing NOTIFY ACL.
#[derive(Clone, Debug)]
pub struct ZoneXfrConfig {
    pub zone: Name,
    pub masters: Vec<Master>,
    pub notify: Vec<NotifyTarget>,
}

/// `TRANSFER_TIMEOUT`: the refresh-retry interval used before any SOA has
/// ever been acquired for a zone.
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(10);

/// `MAX_ROUNDS`: full sweeps through the master list attempted before the
/// coordinator backs off and waits a full `retry` interval.
pub const MAX_ROUNDS: u32 = 3;

/// `TSIG_MAX_UNSIGNED`: the maximum number of consecutive reply packets a
/// streaming transfer may go without a verified TSIG record.
pub const TSIG_MAX_UNSIGNED: u32 = 103;

/// `NOTIFY_MAX_NUM`: retry attempts for one NOTIFY target before giving up.
pub const NOTIFY_MAX_NUM: u32 = 5;

/// `NOTIFY_RETRY_TIMEOUT`: delay between NOTIFY retries.
pub const NOTIFY_RETRY_TIMEOUT: Duration = Duration::from_secs(15);

/// `XFRD_MAX_TCP`: the bounded number of concurrent outbound transfer TCP
/// connections the coordinator holds open across all zones.
pub const XFRD_MAX_TCP: usize = 10;

/// Lower/upper bounds on the `ok`-state refresh deadline (`spec.md` section
/// 4.4's timer policy: "lower-bounded by 1s and upper-bounded by expire").
pub const MIN_REFRESH: Duration = Duration::from_secs(1);
