//! The object a host binary actually constructs: a loaded [`Snapshot`]
//! paired with the resolver knobs to answer queries against it, and the
//! IPC sender a zone loader or XFR coordinator uses to tell the serving
//! side a zone was added or reloaded. This is `spec.md`'s "resolver,
//! zone-loader, XFR" entry-point triad bundled behind one handle.

use std::sync::Arc;

use nsd_database::Ndb;
use nsd_ipc::{QueueSender, Reply, Request};
use nsd_proto::op::message::Message;
use nsd_resolver::{Resolver, Transport};

use crate::config::CoreConfig;
use crate::snapshot::Snapshot;

pub struct Core {
    config: CoreConfig,
    snapshot: Arc<Snapshot>,
    workers: QueueSender,
}

impl Core {
    pub fn new(config: CoreConfig, initial: Ndb, workers: QueueSender) -> Self {
        Core {
            config,
            snapshot: Arc::new(Snapshot::new(initial)),
            workers,
        }
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    /// Answers one query against the database as it stands right now.
    pub fn resolve(&self, request: &Message, transport: Transport) -> Option<Message> {
        let resolver = Resolver::new(self.config.resolver.clone());
        resolver.resolve(&self.snapshot.load(), request, transport)
    }

    /// Swaps in a freshly-built database (e.g. after an XFR commit) and
    /// lets the serving workers know, via the IPC queue, that `zone` has
    /// a new snapshot to serve.
    pub async fn reload(&self, zone: nsd_proto::rr::Name, rebuilt: Ndb) -> nsd_ipc::IpcResult<Reply> {
        self.snapshot.store(rebuilt);
        self.workers.submit(Request::Reload { zone }).await
    }
}
