//! An RRset: one or more RRs of the same type and owner, all from the same
//! zone (NSD's `struct rrset`).

use nsd_proto::rr::{Record, RecordType};

use crate::zone::ZoneId;

#[derive(Debug, Clone)]
pub struct Rrset {
    zone: ZoneId,
    records: Vec<Record>,
}

impl Rrset {
    pub fn new(zone: ZoneId, first: Record) -> Self {
        Rrset {
            zone,
            records: vec![first],
        }
    }

    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    pub fn record_type(&self) -> RecordType {
        self.records[0].record_type()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn push(&mut self, record: Record) {
        debug_assert_eq!(record.record_type(), self.record_type());
        self.records.push(record);
    }

    /// Removes every record matching `predicate`; used by the XFR
    /// coordinator to apply an IXFR "delete" tuple.
    pub fn retain(&mut self, predicate: impl Fn(&Record) -> bool) {
        self.records.retain(|r| predicate(r));
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// TTL of the RRset: RFC 2181 section 5.2 requires all RRs in an RRset
    /// to share one TTL; we use the first record's and rely on load-time
    /// normalization (`Ndb::add_record`) to enforce that invariant.
    pub fn ttl(&self) -> u32 {
        self.records[0].ttl()
    }
}
