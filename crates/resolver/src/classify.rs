//! Query classification against the name database (`spec.md` section 4.3
//! step 4's table): finds the authoritative zone for a name, then decides
//! whether an exact match is a positive answer, a CNAME to chase, NODATA, a
//! referral, or — for a non-exact match with a matching wildcard child — a
//! wildcard expansion. Everything else is NXDOMAIN.

use nsd_database::{DomainId, Ndb, ZoneId};
use nsd_proto::rr::{Name, RecordType};

/// The outcome of classifying one name against one zone.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    Positive,
    Cname,
    NoData,
    /// A `DS` query landing exactly on a delegation cut: the DS RRset (if
    /// any) lives in this zone, not the child, so the parent answers NODATA
    /// here instead of referring the query down — `nsec3_answer_nodata`'s
    /// `qtype == TYPE_DS` branch in `nsec3.c`.
    NoDataDs,
    Referral,
    Wildcard { wildcard_domain: DomainId },
    NxDomain,
}

#[derive(Copy, Clone, Debug)]
pub struct ClassifyResult {
    pub classification: Classification,
    /// The closest existing ancestor of the query name — used for NSEC3
    /// closest-encloser proofs regardless of outcome.
    pub closest_encloser: DomainId,
    /// The domain actually carrying any answer data: the exact-match
    /// domain, or the wildcard domain for a wildcard expansion. The owner
    /// name placed in the answer is always the query name, not this
    /// domain's own name.
    pub answer_domain: DomainId,
}

/// Walks from `qname` up to the root, returning the first zone whose apex
/// matches and which has a loaded SOA (`spec.md` section 4.3 step 3: "find
/// the deepest authoritative zone"). A registered-but-not-yet-loaded zone
/// (no SOA) is skipped, not treated as authoritative.
pub fn find_authoritative_zone(ndb: &Ndb, qname: &Name) -> Option<ZoneId> {
    let mut candidate = qname.clone();
    loop {
        if let Some(zone) = ndb.find_zone_by_apex(&candidate) {
            if ndb.zone_soa(zone).is_some() {
                return Some(zone);
            }
        }
        match candidate.parent() {
            Some(parent) => candidate = parent,
            None => return None,
        }
    }
}

pub fn classify(ndb: &Ndb, zone: ZoneId, qname: &Name, qtype: RecordType) -> ClassifyResult {
    let lookup = ndb.lookup(qname);
    let apex = ndb.zone(zone).apex();

    if lookup.exact {
        let domain = lookup.closest_encloser;
        let d = ndb.domain(domain);

        if d.find_rrset(zone, qtype).is_some() {
            return ClassifyResult {
                classification: Classification::Positive,
                closest_encloser: domain,
                answer_domain: domain,
            };
        }
        if qtype != RecordType::CNAME && d.find_rrset(zone, RecordType::CNAME).is_some() {
            return ClassifyResult {
                classification: Classification::Cname,
                closest_encloser: domain,
                answer_domain: domain,
            };
        }
        if domain != apex && d.find_rrset(zone, RecordType::NS).is_some() {
            if qtype == RecordType::DS {
                return ClassifyResult {
                    classification: Classification::NoDataDs,
                    closest_encloser: domain,
                    answer_domain: domain,
                };
            }
            return ClassifyResult {
                classification: Classification::Referral,
                closest_encloser: domain,
                answer_domain: domain,
            };
        }
        return ClassifyResult {
            classification: Classification::NoData,
            closest_encloser: domain,
            answer_domain: domain,
        };
    }

    let encloser = lookup.closest_encloser;
    if let Some(candidate) = ndb.domain(encloser).wildcard_child_closest_match() {
        // `wildcard_child_closest_match` only guarantees "sorts at or
        // before `*`"; confirm the candidate really is a wildcard label
        // before treating this as an expansion.
        if ndb.domain(candidate).is_wildcard() {
            return ClassifyResult {
                classification: Classification::Wildcard { wildcard_domain: candidate },
                closest_encloser: encloser,
                answer_domain: candidate,
            };
        }
    }
    ClassifyResult {
        classification: Classification::NxDomain,
        closest_encloser: encloser,
        answer_domain: encloser,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsd_proto::rr::{DNSClass, RData};
    use nsd_proto::rr::rdata::Soa;

    fn soa_record(owner: &Name) -> nsd_proto::rr::Record {
        nsd_proto::rr::Record::new(
            owner.clone(),
            DNSClass::IN,
            3600,
            RData::Soa(Soa {
                mname: Name::parse("ns1", Some(owner)).unwrap(),
                rname: Name::parse("hostmaster", Some(owner)).unwrap(),
                serial: 1,
                refresh: 1,
                retry: 1,
                expire: 1,
                minimum: 1,
            }),
        )
    }

    fn a_record(owner: &Name) -> nsd_proto::rr::Record {
        nsd_proto::rr::Record::new(owner.clone(), DNSClass::IN, 3600, RData::A(std::net::Ipv4Addr::LOCALHOST))
    }

    #[test]
    fn exact_match_with_requested_type_is_positive() {
        let mut ndb = Ndb::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        let apex_id = ndb.zone(zone).apex();
        ndb.add_record(apex_id, zone, soa_record(&apex));

        let owner = Name::parse("www.example.com.", None).unwrap();
        let id = ndb.insert_domain(owner.clone());
        ndb.add_record(id, zone, a_record(&owner));

        let result = classify(&ndb, zone, &owner, RecordType::A);
        assert_eq!(result.classification, Classification::Positive);
    }

    #[test]
    fn exact_match_without_requested_type_is_nodata() {
        let mut ndb = Ndb::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        let apex_id = ndb.zone(zone).apex();
        ndb.add_record(apex_id, zone, soa_record(&apex));

        let owner = Name::parse("www.example.com.", None).unwrap();
        let id = ndb.insert_domain(owner.clone());
        ndb.add_record(id, zone, a_record(&owner));

        let result = classify(&ndb, zone, &owner, RecordType::AAAA);
        assert_eq!(result.classification, Classification::NoData);
    }

    #[test]
    fn exact_match_with_cname_is_chased() {
        let mut ndb = Ndb::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        let apex_id = ndb.zone(zone).apex();
        ndb.add_record(apex_id, zone, soa_record(&apex));

        let owner = Name::parse("alias.example.com.", None).unwrap();
        let target = Name::parse("www.example.com.", None).unwrap();
        let id = ndb.insert_domain(owner.clone());
        ndb.add_record(
            id,
            zone,
            nsd_proto::rr::Record::new(owner.clone(), DNSClass::IN, 3600, RData::Cname(target)),
        );

        let result = classify(&ndb, zone, &owner, RecordType::A);
        assert_eq!(result.classification, Classification::Cname);
    }

    #[test]
    fn delegation_with_ns_is_a_referral() {
        let mut ndb = Ndb::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        let apex_id = ndb.zone(zone).apex();
        ndb.add_record(apex_id, zone, soa_record(&apex));

        let cut = Name::parse("sub.example.com.", None).unwrap();
        let id = ndb.insert_domain(cut.clone());
        ndb.add_record(
            id,
            zone,
            nsd_proto::rr::Record::new(cut.clone(), DNSClass::IN, 3600, RData::Ns(Name::parse("ns1.sub.example.com.", None).unwrap())),
        );

        let result = classify(&ndb, zone, &cut, RecordType::A);
        assert_eq!(result.classification, Classification::Referral);
    }

    #[test]
    fn ds_query_at_a_cut_with_no_ds_rrset_is_nodata_ds_not_a_referral() {
        let mut ndb = Ndb::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        let apex_id = ndb.zone(zone).apex();
        ndb.add_record(apex_id, zone, soa_record(&apex));

        let cut = Name::parse("sub.example.com.", None).unwrap();
        let id = ndb.insert_domain(cut.clone());
        ndb.add_record(
            id,
            zone,
            nsd_proto::rr::Record::new(cut.clone(), DNSClass::IN, 3600, RData::Ns(Name::parse("ns1.sub.example.com.", None).unwrap())),
        );

        let result = classify(&ndb, zone, &cut, RecordType::DS);
        assert_eq!(result.classification, Classification::NoDataDs);
    }

    #[test]
    fn ds_query_at_a_cut_with_a_ds_rrset_is_positive() {
        let mut ndb = Ndb::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        let apex_id = ndb.zone(zone).apex();
        ndb.add_record(apex_id, zone, soa_record(&apex));

        let cut = Name::parse("sub.example.com.", None).unwrap();
        let id = ndb.insert_domain(cut.clone());
        ndb.add_record(
            id,
            zone,
            nsd_proto::rr::Record::new(cut.clone(), DNSClass::IN, 3600, RData::Ns(Name::parse("ns1.sub.example.com.", None).unwrap())),
        );
        ndb.add_record(
            id,
            zone,
            nsd_proto::rr::Record::new(
                cut.clone(),
                DNSClass::IN,
                3600,
                RData::Ds(nsd_proto::rr::rdata::Ds { key_tag: 1, algorithm: 8, digest_type: 2, digest: Box::new([0u8; 32]) }),
            ),
        );

        let result = classify(&ndb, zone, &cut, RecordType::DS);
        assert_eq!(result.classification, Classification::Positive);
    }

    #[test]
    fn non_exact_with_wildcard_child_expands() {
        let mut ndb = Ndb::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        let apex_id = ndb.zone(zone).apex();
        ndb.add_record(apex_id, zone, soa_record(&apex));

        let wildcard = Name::parse("*.w.example.com.", None).unwrap();
        let wid = ndb.insert_domain(wildcard.clone());
        ndb.add_record(wid, zone, a_record(&wildcard));

        let query = Name::parse("a.w.example.com.", None).unwrap();
        let result = classify(&ndb, zone, &query, RecordType::A);
        match result.classification {
            Classification::Wildcard { wildcard_domain } => assert_eq!(wildcard_domain, wid),
            other => panic!("expected Wildcard, got {other:?}"),
        }
    }

    #[test]
    fn non_exact_without_wildcard_is_nxdomain() {
        let mut ndb = Ndb::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        let apex_id = ndb.zone(zone).apex();
        ndb.add_record(apex_id, zone, soa_record(&apex));

        let query = Name::parse("nope.example.com.", None).unwrap();
        let result = classify(&ndb, zone, &query, RecordType::A);
        assert_eq!(result.classification, Classification::NxDomain);
    }

    #[test]
    fn find_authoritative_zone_requires_a_loaded_soa() {
        let mut ndb = Ndb::new();
        let apex = Name::parse("example.com.", None).unwrap();
        ndb.add_zone(apex.clone()).unwrap(); // no SOA added yet

        let qname = Name::parse("www.example.com.", None).unwrap();
        assert!(find_authoritative_zone(&ndb, &qname).is_none());
    }
}
