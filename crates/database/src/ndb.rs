//! The assembled in-memory name database: the domain region, the radix
//! index, and the zone table, grounded on NSD's `struct namedb`.

use std::collections::BTreeMap;

use nsd_proto::rr::{Name, Record, RecordType};

use crate::domain::{Domain, DomainId};
use crate::error::{DatabaseError, DatabaseResult};
use crate::radix::RadixTree;
use crate::region::Region;
use crate::zone::{Zone, ZoneId};

/// The outcome of a name lookup against the tree, mirroring
/// `domain_table_search`'s `(closest_match, closest_encloser, exact)`.
pub struct Lookup {
    pub closest_encloser: DomainId,
    pub exact: bool,
}

#[derive(Default)]
pub struct Ndb {
    domains: Region<Domain>,
    zones: Region<Zone>,
    radix: RadixTree,
    zone_by_apex: BTreeMap<Name, ZoneId>,
}

impl Ndb {
    pub fn new() -> Self {
        let mut ndb = Ndb {
            domains: Region::new(),
            zones: Region::new(),
            radix: RadixTree::new(),
            zone_by_apex: BTreeMap::new(),
        };
        // Ordinal 0 is the unused "after header" slot; the root itself is
        // ordinal 1, and every further domain is numbered from there.
        let root_id = ndb.domains.alloc(Domain::new(Name::root(), None, 1));
        // NSD pins the root's usage to 1 at startup so it is never a
        // candidate for reclamation, regardless of what else unpins it.
        ndb.domains.get_mut(root_id).pin();
        ndb.radix.insert(Name::root(), root_id);
        ndb
    }

    pub fn domain(&self, id: DomainId) -> &Domain {
        self.domains.get(id)
    }

    pub fn domain_mut(&mut self, id: DomainId) -> &mut Domain {
        self.domains.get_mut(id)
    }

    pub fn zone(&self, id: ZoneId) -> &Zone {
        self.zones.get(id)
    }

    pub fn zone_mut(&mut self, id: ZoneId) -> &mut Zone {
        self.zones.get_mut(id)
    }

    pub fn radix(&self) -> &RadixTree {
        &self.radix
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    /// Inserts `name` (and any missing ancestors) into the tree, returning
    /// its id. Idempotent: re-inserting an existing name is a lookup.
    pub fn insert_domain(&mut self, name: Name) -> DomainId {
        if let Some(id) = self.radix.get(&name) {
            return id;
        }
        let parent_id = name.parent().map(|parent| self.insert_domain(parent));
        // Ordinals 0 and 1 are taken by the header slot and the root, so
        // the Nth domain allocated after the root gets ordinal N + 1.
        let number = self.domains.len() as u32 + 1;
        let id = self.domains.alloc(Domain::new(name.clone(), parent_id, number));
        self.radix.insert(name, id);

        if let Some(pid) = parent_id {
            if self.domains.get(id).is_wildcard() {
                self.domains.get_mut(pid).set_wildcard_child_closest_match(Some(id));
            }
        }
        id
    }

    /// Registers a new zone rooted at `apex`, inserting the apex domain if
    /// needed. Fails if a zone with this apex already exists.
    pub fn add_zone(&mut self, apex: Name) -> DatabaseResult<ZoneId> {
        if self.zone_by_apex.contains_key(&apex) {
            return Err(DatabaseError::DuplicateZone(apex));
        }
        let apex_id = self.insert_domain(apex.clone());
        let number = self.zones.len() as u32;
        let zone_id = self.zones.alloc(Zone::new(apex_id, number));
        self.domains.get_mut(apex_id).owning_zone = Some(zone_id);
        self.zone_by_apex.insert(apex, zone_id);
        Ok(zone_id)
    }

    pub fn find_zone_by_apex(&self, apex: &Name) -> Option<ZoneId> {
        self.zone_by_apex.get(apex).copied()
    }

    /// Finds the zone that would authoritatively serve `name`: the zone
    /// whose apex is the longest ancestor (or `name` itself) among all
    /// registered zones that have actually finished loading (carry a SOA).
    /// A zone registered by `add_zone` but not yet past `MissingSoa` is a
    /// failed or in-progress load, not a real zone — `find_authoritative_zone`
    /// applies the same filter, and the two must agree.
    pub fn find_zone_for(&self, name: &Name) -> Option<ZoneId> {
        self.zone_by_apex
            .iter()
            .filter(|(apex, _)| name.is_subdomain(apex))
            .filter(|(_, &zone)| self.zone_soa(zone).is_some())
            .max_by_key(|(apex, _)| apex.label_count())
            .map(|(_, &zone)| zone)
    }

    /// Adds `record` to `domain`'s RRset, then marks `domain` and every
    /// ancestor up to the root as existing — an owner name with data
    /// implies its whole ancestor chain exists too.
    pub fn add_record(&mut self, domain: DomainId, zone: ZoneId, record: Record) {
        self.domains.get_mut(domain).add_record(zone, record);
        let mut current = self.domains.get(domain).parent();
        while let Some(id) = current {
            self.domains.get_mut(id).mark_existing();
            current = self.domains.get(id).parent();
        }
    }

    /// `domain_table_deldomain`: reclaims `domain` if it carries no RRsets,
    /// no `usage` pins, and no descendants, then repeats the check on its
    /// parent — reclamation cascades upward exactly as far as it can.
    /// Returns `true` if anything was actually reclaimed. The root is
    /// never reclaimed (its `usage` is permanently pinned in `new`).
    pub fn delete_domain(&mut self, domain: DomainId) -> bool {
        let mut current = Some(domain);
        let mut deleted_any = false;
        while let Some(id) = current {
            if !self.is_deletable(id) {
                break;
            }
            current = self.domains.get(id).parent();
            self.reclaim(id);
            deleted_any = true;
        }
        deleted_any
    }

    fn is_deletable(&self, id: DomainId) -> bool {
        let domain = self.domains.get(id);
        domain.parent().is_some()
            && domain.usage() == 0
            && domain.rrsets().is_empty()
            && !self.radix.has_descendants(domain.name())
    }

    /// `do_deldomain`: moves `id`'s ordinal to whichever live domain
    /// currently holds the highest one, then frees `id`'s slot — so the
    /// set of ordinals in use stays the dense permutation `{1..N}` without
    /// renumbering anything in the middle.
    fn reclaim(&mut self, id: DomainId) {
        let dying_number = self.domains.get(id).number();
        if let Some(tail_id) = self.domain_with_max_number() {
            if tail_id != id {
                self.domains.get_mut(tail_id).set_number(dying_number);
            }
        }

        if let Some(parent_id) = self.domains.get(id).parent() {
            if self.domains.get(parent_id).wildcard_child_closest_match() == Some(id) {
                self.domains.get_mut(parent_id).set_wildcard_child_closest_match(None);
            }
        }

        let name = self.domains.get(id).name().clone();
        self.radix.remove(&name);
        self.domains.remove(id);
    }

    fn domain_with_max_number(&self) -> Option<DomainId> {
        self.domains.iter().max_by_key(|(_, domain)| domain.number()).map(|(id, _)| id)
    }

    /// `domain_table_search`: finds `name` or its closest existing
    /// ancestor in the tree. The tree always contains the root, so this
    /// never fails to find an encloser.
    pub fn lookup(&self, name: &Name) -> Lookup {
        let (closest_encloser, exact) = self
            .radix
            .closest_encloser(name)
            .expect("the root domain is always present");
        Lookup { closest_encloser, exact }
    }

    /// The SOA record at a zone's apex, if loaded.
    pub fn zone_soa(&self, zone: ZoneId) -> Option<&Record> {
        let apex = self.zone(zone).apex();
        self.domain(apex)
            .find_rrset(zone, RecordType::SOA)
            .and_then(|rrset| rrset.records().first())
    }
}
