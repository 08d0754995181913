//! Wires `nsd-database`, `nsd-resolver`, `nsd-xfr`, and `nsd-ipc` behind
//! the resolver/zone-loader/XFR entry points: a `Snapshot` workers read
//! queries against, a `ZoneLoader` that turns parsed records into a
//! database, and the `CoreConfig` both of those and the XFR coordinator
//! are built from. Free of UDP/TCP listening loops and on-disk file
//! formats by design — see `SPEC_FULL.md` section 1's Non-goals.

pub mod config;
pub mod control;
pub mod core;
pub mod error;
pub mod loader;
pub mod logging;
pub mod ondisk;
pub mod snapshot;

pub use config::{CoreConfig, ZoneConfig};
pub use control::{Command, Reply};
pub use core::Core;
pub use error::{CoreError, CoreResult};
pub use loader::{ParsedRr, ZoneLoader};
pub use logging::init_default_logging;
pub use ondisk::{DiffLogEntry, DiffLogRecord, OnDiskHeader};
pub use snapshot::Snapshot;
