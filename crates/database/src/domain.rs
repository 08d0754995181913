//! A single node in the domain-name tree, grounded on NSD's `struct
//! domain` in `namedb.h`.

use nsd_proto::rr::{Name, Record, RecordType};

use crate::region::RegionId;
use crate::rrset::Rrset;
use crate::zone::ZoneId;

pub type DomainId = RegionId<Domain>;

/// Precomputed NSEC3 pointers for a domain, filled in by
/// [`crate::nsec3::prehash_zone`]. `None` until prehashing runs (or for
/// zones without NSEC3PARAM).
#[derive(Debug, Default, Clone, Copy)]
pub struct Nsec3Pointers {
    /// The NSEC3 RR whose owner hash covers (or, if exact, equals) this
    /// domain's hash — `nsec3_cover`/`nsec3_exact` in `nsec3.c`.
    pub cover: Option<DomainId>,
    pub cover_is_exact: bool,
    /// The NSEC3 RR covering `*.this-domain`'s hash, for wildcard denial.
    pub wildcard_cover: Option<DomainId>,
    /// In the parent zone, the NSEC3 RR whose owner hash exactly matches
    /// this domain's hash — proves DS non-existence directly, when present.
    pub ds_parent_exact: Option<DomainId>,
    /// In the parent zone, the NSEC3 RR covering (but not matching) this
    /// domain's hash, used to prove DS non-existence when no exact match
    /// exists (opt-out or plain absence).
    pub ds_parent_cover: Option<DomainId>,
}

#[derive(Debug)]
pub struct Domain {
    name: Name,
    parent: Option<DomainId>,
    /// NSD's `wildcard_child_closest_match`: the closest descendant whose
    /// immediate child could be a wildcard match for queries under this
    /// domain, maintained incrementally as domains are inserted.
    wildcard_child_closest_match: Option<DomainId>,
    rrsets: Vec<Rrset>,
    /// Stable insertion-order number, exposed for IXFR diff bookkeeping
    /// and external tooling that wants a compact zone-local id.
    number: u32,
    /// A domain exists (per RFC 4592's wildcard clarification) once it has
    /// at least one RRset of its own; empty non-terminals (e.g. `b` in
    /// `a.b.example.` when only `a.b.example.` has data) are kept in the
    /// tree for traversal but do not "exist" for NXDOMAIN purposes.
    is_existing: bool,
    pub(crate) owning_zone: Option<ZoneId>,
    pub nsec3: Nsec3Pointers,
    /// Reference count pinning this domain against deletion — NSD's
    /// `domain->usage` in `namedb.h`. Non-zero means `Ndb::delete_domain`
    /// must leave it (and therefore its ancestors) alone.
    usage: u32,
}

impl Domain {
    pub fn new(name: Name, parent: Option<DomainId>, number: u32) -> Self {
        Domain {
            name,
            parent,
            wildcard_child_closest_match: None,
            rrsets: Vec::new(),
            number,
            is_existing: false,
            owning_zone: None,
            nsec3: Nsec3Pointers::default(),
            usage: 0,
        }
    }

    pub fn usage(&self) -> u32 {
        self.usage
    }

    /// Pins the domain so `Ndb::delete_domain` will not reclaim it.
    pub fn pin(&mut self) {
        self.usage += 1;
    }

    pub fn unpin(&mut self) {
        self.usage = self.usage.saturating_sub(1);
    }

    pub(crate) fn set_number(&mut self, number: u32) {
        self.number = number;
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn parent(&self) -> Option<DomainId> {
        self.parent
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn is_existing(&self) -> bool {
        self.is_existing
    }

    /// The zone this domain is the apex of, if any (`domain_find_zone` in
    /// `namedb.h`, restricted to the exact-apex case — interior lookups go
    /// through `Ndb::find_zone_for` instead).
    pub fn owning_zone(&self) -> Option<ZoneId> {
        self.owning_zone
    }

    pub fn wildcard_child_closest_match(&self) -> Option<DomainId> {
        self.wildcard_child_closest_match
    }

    pub(crate) fn set_wildcard_child_closest_match(&mut self, id: Option<DomainId>) {
        self.wildcard_child_closest_match = id;
    }

    pub fn rrsets(&self) -> &[Rrset] {
        &self.rrsets
    }

    pub fn find_rrset(&self, zone: ZoneId, rtype: RecordType) -> Option<&Rrset> {
        self.rrsets.iter().find(|r| r.zone() == zone && r.record_type() == rtype)
    }

    pub fn find_rrset_mut(&mut self, zone: ZoneId, rtype: RecordType) -> Option<&mut Rrset> {
        self.rrsets.iter_mut().find(|r| r.zone() == zone && r.record_type() == rtype)
    }

    pub fn find_any_rrset(&self, zone: ZoneId) -> Option<&Rrset> {
        self.rrsets.iter().find(|r| r.zone() == zone)
    }

    /// Marks this domain as existing, i.e. carrying at least one RRset of
    /// its own (as opposed to being an empty non-terminal kept only for
    /// traversal). `Ndb::add_record` also calls this on every ancestor up
    /// to the root, since an owner name existing implies all its ancestors
    /// exist too.
    pub(crate) fn mark_existing(&mut self) {
        self.is_existing = true;
    }

    /// Adds `record` to this domain's RRset for its type in `zone`,
    /// creating the RRset if needed, and marks the domain as existing.
    pub fn add_record(&mut self, zone: ZoneId, record: Record) {
        self.is_existing = true;
        let rtype = record.record_type();
        if let Some(rrset) = self.rrsets.iter_mut().find(|r| r.zone() == zone && r.record_type() == rtype) {
            rrset.push(record);
        } else {
            self.rrsets.push(Rrset::new(zone, record));
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.name.is_wildcard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use nsd_proto::rr::{DNSClass, RData};
    use std::net::Ipv4Addr;

    fn zone_id(region: &mut Region<crate::zone::Zone>, apex: DomainId) -> ZoneId {
        region.alloc(crate::zone::Zone::new(apex, 0))
    }

    #[test]
    fn adding_a_record_marks_domain_existing() {
        let mut domains: Region<Domain> = Region::new();
        let mut zones: Region<crate::zone::Zone> = Region::new();
        let name = Name::parse("www.example.com.", None).unwrap();
        let id = domains.alloc(Domain::new(name, None, 0));
        let zid = zone_id(&mut zones, id);

        let domain = domains.get_mut(id);
        assert!(!domain.is_existing());
        domain.add_record(zid, Record::new(domain.name().clone(), DNSClass::IN, 300, RData::A(Ipv4Addr::LOCALHOST)));
        assert!(domain.is_existing());
        assert_eq!(domain.find_rrset(zid, RecordType::A).unwrap().records().len(), 1);
    }
}
