//! Per-zone zone-transfer coordination: SOA-timer-driven polling,
//! IXFR-over-UDP probes with TCP/AXFR fallback, TSIG-authenticated
//! streaming, and outgoing NOTIFY retries.
//!
//! [`state::ZoneXfr`] is the pure state machine; [`coordinator::Coordinator`]
//! is the tokio driver that owns sockets and timers around it.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod notify;
pub mod pool;
pub mod probe;
pub mod sink;
pub mod state;
pub mod stream;

pub use coordinator::{Coordinator, NotifyReceipt, XfrTransport};
pub use error::{XfrError, XfrResult};
pub use sink::{Changeset, CountingReloadRequester, DiffLogSink, ReloadRequester, VecDiffLogSink};
pub use state::{IoIntent, XfrAction, XfrEvent, XfrState, ZoneXfr};
pub use stream::{StreamAssembler, TransferKind};
