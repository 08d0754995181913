//! Persistence seams (`spec.md` section 4.4's "Persistence" paragraph):
//! the coordinator never mutates the served database directly. Every
//! verified reply, and the final commit, is appended to a difflog through
//! [`DiffLogSink`]; a successful commit then asks the serving side to
//! reload through [`ReloadRequester`]. Both are traits so an embedder can
//! supply its own on-disk format and IPC channel; [`VecDiffLogSink`] is an
//! in-memory stand-in for tests.

use nsd_proto::rr::{Name, Record};

use crate::error::XfrResult;
use crate::stream::TransferKind;

/// One applied transfer, ready to be appended to a difflog.
#[derive(Debug, Clone)]
pub struct Changeset {
    pub zone: Name,
    pub kind: TransferKind,
    pub old_serial: Option<u32>,
    pub new_serial: u32,
    pub deleted: Vec<Record>,
    pub added: Vec<Record>,
}

/// Durable storage for zone transfer results, ahead of the in-memory
/// database being reloaded.
pub trait DiffLogSink: Send + Sync {
    fn append(&self, changeset: &Changeset) -> XfrResult<()>;
}

/// Asks the serving side to pick up whatever the difflog now holds.
pub trait ReloadRequester: Send + Sync {
    fn request_reload(&self, zone: &Name) -> XfrResult<()>;
}

/// An in-memory [`DiffLogSink`] that just remembers everything appended to
/// it, for tests that want to assert on what the coordinator persisted.
#[derive(Default)]
pub struct VecDiffLogSink {
    entries: std::sync::Mutex<Vec<Changeset>>,
}

impl VecDiffLogSink {
    pub fn new() -> Self {
        VecDiffLogSink::default()
    }

    pub fn entries(&self) -> Vec<Changeset> {
        self.entries.lock().expect("lock poisoned").clone()
    }
}

impl DiffLogSink for VecDiffLogSink {
    fn append(&self, changeset: &Changeset) -> XfrResult<()> {
        self.entries.lock().expect("lock poisoned").push(changeset.clone());
        Ok(())
    }
}

/// An in-memory [`ReloadRequester`] that just counts how many times a
/// reload was requested, per zone.
#[derive(Default)]
pub struct CountingReloadRequester {
    requests: std::sync::Mutex<Vec<Name>>,
}

impl CountingReloadRequester {
    pub fn new() -> Self {
        CountingReloadRequester::default()
    }

    pub fn requests(&self) -> Vec<Name> {
        self.requests.lock().expect("lock poisoned").clone()
    }
}

impl ReloadRequester for CountingReloadRequester {
    fn request_reload(&self, zone: &Name) -> XfrResult<()> {
        self.requests.lock().expect("lock poisoned").push(zone.clone());
        Ok(())
    }
}
