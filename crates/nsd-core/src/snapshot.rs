//! The "single process, multiple threads serving a reference-counted
//! immutable snapshot" model (`SPEC_FULL.md` section 5): workers borrow
//! `Snapshot::load()` for the duration of one response; an XFR commit (or
//! the zone loader, at startup) builds the next `Ndb` off to the side and
//! calls `Snapshot::store`, the same swap `arc-swap`'s own docs describe
//! for a read-mostly config/routing-table value.

use std::sync::Arc;

use arc_swap::ArcSwap;
use nsd_database::Ndb;

pub struct Snapshot {
    inner: ArcSwap<Ndb>,
}

impl Snapshot {
    pub fn new(ndb: Ndb) -> Self {
        Snapshot {
            inner: ArcSwap::from_pointee(ndb),
        }
    }

    /// Borrows the database as it stood at the moment of the call. Safe to
    /// hold for the lifetime of one query: a concurrent `store` never
    /// mutates the `Ndb` this points at, it only swaps in a new one.
    pub fn load(&self) -> Arc<Ndb> {
        self.inner.load_full()
    }

    pub fn store(&self, ndb: Ndb) {
        self.inner.store(Arc::new(ndb));
    }
}
