//! Precomputed NSEC3 cover/exact pointers, grounded on `prehash_zone`,
//! `prehash_domain`, `prehash_ds` and `nsec3_find_cover` in NSD's
//! `nsec3.c`. Zone data is expected to already carry its NSEC3 RRs (this
//! server answers from pre-signed zones; it does not sign).
//!
//! NSEC3 owner names are `<base32hex(hash)>.<apex>`, and base32hex's
//! alphabet happens to preserve byte order under numeric hash order, so
//! the canonical name ordering already sorts same-zone NSEC3 owners by
//! hash value. `Nsec3Chain` exploits that: it is just the sorted list of
//! `(owner name, domain)` pairs carrying an NSEC3 RRset in one zone.

use nsd_proto::nsec3;
use nsd_proto::rr::{Name, RecordType};

use crate::domain::DomainId;
use crate::ndb::Ndb;
use crate::zone::ZoneId;

pub struct Nsec3Chain {
    /// Ascending by owner name, equivalently by NSEC3 hash value.
    owners: Vec<(Name, DomainId)>,
}

impl Nsec3Chain {
    pub fn build(ndb: &Ndb, zone: ZoneId) -> Option<Self> {
        let apex_id = ndb.zone(zone).apex();
        let apex_name = ndb.domain(apex_id).name().clone();
        let mut owners: Vec<(Name, DomainId)> = ndb
            .radix()
            .zone_names(&apex_name)
            .filter(|(_, id)| ndb.domain(*id).find_rrset(zone, RecordType::NSEC3).is_some())
            .map(|(name, id)| (name.clone(), id))
            .collect();
        if owners.is_empty() {
            return None;
        }
        owners.sort_by(|a, b| a.0.cmp(&b.0));
        Some(Nsec3Chain { owners })
    }

    /// Finds the covering (or, if present, exact) NSEC3 record for
    /// `hashed_owner`. Mirrors `nsec3_find_cover`: the predecessor in hash
    /// order, wrapping to the chain's last entry when `hashed_owner` sorts
    /// before everything (covers the circular hash space's wraparound).
    pub fn find_cover(&self, hashed_owner: &Name) -> (DomainId, bool) {
        let idx = self.owners.partition_point(|(name, _)| name < hashed_owner);
        if idx < self.owners.len() && self.owners[idx].0 == *hashed_owner {
            return (self.owners[idx].1, true);
        }
        if idx == 0 {
            (self.owners[self.owners.len() - 1].1, false)
        } else {
            (self.owners[idx - 1].1, false)
        }
    }
}

/// Computes and stores `nsec3_cover`/`nsec3_wcard_child_cover` for every
/// domain in `zone`, and `nsec3_ds_parent_cover` for delegation points
/// whose parent zone is also served here (`prehash_zone` in `nsec3.c`).
pub fn prehash_zone(ndb: &mut Ndb, zone: ZoneId) {
    let Some(param) = ndb.zone(zone).nsec3_param().cloned() else {
        return;
    };
    let Some(chain) = Nsec3Chain::build(ndb, zone) else {
        return;
    };
    let apex_id = ndb.zone(zone).apex();
    let apex_name = ndb.domain(apex_id).name().clone();

    let domain_ids: Vec<DomainId> = ndb.radix().zone_names(&apex_name).map(|(_, id)| id).collect();

    for domain_id in domain_ids {
        let owner_name = ndb.domain(domain_id).name().clone();

        let hashed = nsec3::hashed_owner_name(&owner_name, &apex_name, &param.salt, param.iterations as u32)
            .expect("owner name already validated on load");
        let (cover, exact) = chain.find_cover(&hashed);

        let wildcard_name = owner_name
            .prepend_label(b"*")
            .expect("prepending one label keeps names within the wire-length limit already enforced");
        let wildcard_hashed =
            nsec3::hashed_owner_name(&wildcard_name, &apex_name, &param.salt, param.iterations as u32)
                .expect("owner name already validated on load");
        let (wildcard_cover, _) = chain.find_cover(&wildcard_hashed);

        let domain = ndb.domain_mut(domain_id);
        domain.nsec3.cover = Some(cover);
        domain.nsec3.cover_is_exact = exact;
        domain.nsec3.wildcard_cover = Some(wildcard_cover);
    }
}

/// Computes the NSEC3 cover for a name that may not itself be in the tree —
/// e.g. the resolver's synthesized "next closer name" during NXDOMAIN proof
/// assembly (`nsec3.c`'s `nsec3_find_cover` is called the same way there).
/// Rebuilds the zone's hash-ordered chain on every call rather than caching
/// it on `Zone`; for a zone with DNSSEC disabled or not yet prehashed this
/// simply returns `None`.
pub fn find_cover_for_name(ndb: &Ndb, zone: ZoneId, name: &Name) -> Option<(DomainId, bool)> {
    let param = ndb.zone(zone).nsec3_param()?.clone();
    let apex_id = ndb.zone(zone).apex();
    let apex_name = ndb.domain(apex_id).name().clone();
    let chain = Nsec3Chain::build(ndb, zone)?;
    let hashed = nsec3::hashed_owner_name(name, &apex_name, &param.salt, param.iterations as u32).ok()?;
    Some(chain.find_cover(&hashed))
}

/// For every domain in `zone` that carries a DS RRset (i.e. is delegated
/// out to a child zone and is not the apex itself), records the NSEC3
/// exact/cover pointer proving DS (non-)existence at the parent side, per
/// `prehash_ds`. Gated on the DS RRset itself, not on NS/SOA presence —
/// `nsec3.c`'s `prehash_ds` calls `domain_find_rrset(walk, zone, TYPE_DS)`
/// directly.
pub fn prehash_ds(ndb: &mut Ndb, zone: ZoneId) {
    let Some(param) = ndb.zone(zone).nsec3_param().cloned() else {
        return;
    };
    let Some(chain) = Nsec3Chain::build(ndb, zone) else {
        return;
    };
    let apex_id = ndb.zone(zone).apex();
    let apex_name = ndb.domain(apex_id).name().clone();

    let ds_owners: Vec<DomainId> = ndb
        .radix()
        .zone_names(&apex_name)
        .filter(|(_, id)| *id != apex_id && ndb.domain(*id).find_rrset(zone, RecordType::DS).is_some())
        .map(|(_, id)| id)
        .collect();

    for domain_id in ds_owners {
        let owner_name = ndb.domain(domain_id).name().clone();
        let hashed = nsec3::hashed_owner_name(&owner_name, &apex_name, &param.salt, param.iterations as u32)
            .expect("owner name already validated on load");
        let (pointer, exact) = chain.find_cover(&hashed);
        let domain = ndb.domain_mut(domain_id);
        if exact {
            domain.nsec3.ds_parent_exact = Some(pointer);
        } else {
            domain.nsec3.ds_parent_cover = Some(pointer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndb::Ndb;
    use nsd_proto::rr::rdata::{Nsec3, Nsec3Param, TypeBitMaps};
    use nsd_proto::rr::{DNSClass, RData, Record};

    fn nsec3_record(owner: Name, next_hashed: Vec<u8>, types: Vec<RecordType>) -> Record {
        Record::new(
            owner,
            DNSClass::IN,
            3600,
            RData::Nsec3(Nsec3 {
                hash_algorithm: 1,
                flags: 0,
                iterations: 1,
                salt: Box::new([]),
                next_hashed_owner: next_hashed.into_boxed_slice(),
                type_bit_maps: TypeBitMaps::from_types(types),
            }),
        )
    }

    #[test]
    fn chain_wraps_around_when_hash_sorts_before_everything() {
        let mut ndb = Ndb::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        ndb.zone_mut(zone).set_nsec3_param(Some(Nsec3Param {
            hash_algorithm: 1,
            flags: 0,
            iterations: 0,
            salt: Box::new([]),
        }));

        for (label, types) in [("aaa", vec![RecordType::A]), ("mmm", vec![RecordType::A]), ("zzz", vec![RecordType::A])] {
            let owner = Name::parse(label, Some(&apex)).unwrap();
            let id = ndb.insert_domain(owner.clone());
            ndb.add_record(id, zone, nsec3_record(owner, vec![0u8; 20], types));
        }

        let chain = Nsec3Chain::build(&ndb, zone).unwrap();
        let before_all = Name::parse("000", Some(&apex)).unwrap();
        let (cover, exact) = chain.find_cover(&before_all);
        assert!(!exact);
        assert_eq!(ndb.domain(cover).name().to_string(), "zzz.example.com.");
    }

    #[test]
    fn find_cover_for_name_hashes_a_name_outside_the_tree() {
        let mut ndb = Ndb::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        ndb.zone_mut(zone).set_nsec3_param(Some(Nsec3Param {
            hash_algorithm: 1,
            flags: 0,
            iterations: 0,
            salt: Box::new([]),
        }));
        let owner = Name::parse("aaa", Some(&apex)).unwrap();
        let id = ndb.insert_domain(owner.clone());
        ndb.add_record(id, zone, nsec3_record(owner, vec![0u8; 20], vec![RecordType::A]));

        let absent = Name::parse("never-inserted", Some(&apex)).unwrap();
        assert!(find_cover_for_name(&ndb, zone, &absent).is_some());
    }

    #[test]
    fn prehash_ds_only_considers_domains_with_a_ds_rrset() {
        let mut ndb = Ndb::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        ndb.zone_mut(zone).set_nsec3_param(Some(Nsec3Param {
            hash_algorithm: 1,
            flags: 0,
            iterations: 0,
            salt: Box::new([]),
        }));
        // an NSEC3 RRset somewhere in the zone so the chain is non-empty.
        let nsec3_owner = Name::parse("aaa", Some(&apex)).unwrap();
        let nsec3_id = ndb.insert_domain(nsec3_owner.clone());
        ndb.add_record(nsec3_id, zone, nsec3_record(nsec3_owner, vec![0u8; 20], vec![RecordType::A]));

        // a delegation point with NS but no DS: must not get a pointer.
        let referral = Name::parse("no-ds", Some(&apex)).unwrap();
        let referral_id = ndb.insert_domain(referral.clone());
        ndb.add_record(
            referral_id,
            zone,
            Record::new(referral, DNSClass::IN, 3600, RData::Ns(Name::parse("ns1.example.com.", None).unwrap())),
        );

        // a domain carrying DS: must get a pointer.
        let secure_delegation = Name::parse("secure", Some(&apex)).unwrap();
        let secure_id = ndb.insert_domain(secure_delegation.clone());
        ndb.add_record(
            secure_id,
            zone,
            Record::new(
                secure_delegation,
                DNSClass::IN,
                3600,
                RData::Ds(nsd_proto::rr::rdata::Ds {
                    key_tag: 1,
                    algorithm: 8,
                    digest_type: 2,
                    digest: Box::new([0u8; 32]),
                }),
            ),
        );

        prehash_ds(&mut ndb, zone);

        assert!(ndb.domain(referral_id).nsec3.ds_parent_cover.is_none());
        assert!(ndb.domain(referral_id).nsec3.ds_parent_exact.is_none());
        assert!(ndb.domain(secure_id).nsec3.ds_parent_cover.is_some() || ndb.domain(secure_id).nsec3.ds_parent_exact.is_some());
    }

    #[test]
    fn exact_hash_match_is_reported() {
        let mut ndb = Ndb::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        ndb.zone_mut(zone).set_nsec3_param(Some(Nsec3Param {
            hash_algorithm: 1,
            flags: 0,
            iterations: 0,
            salt: Box::new([]),
        }));
        let owner = Name::parse("aaa", Some(&apex)).unwrap();
        let id = ndb.insert_domain(owner.clone());
        ndb.add_record(id, zone, nsec3_record(owner.clone(), vec![0u8; 20], vec![RecordType::A]));

        let chain = Nsec3Chain::build(&ndb, zone).unwrap();
        let (found, exact) = chain.find_cover(&owner);
        assert!(exact);
        assert_eq!(found, id);
    }
}
