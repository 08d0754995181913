//! Response-section assembly: copying RRsets into a `Message` under the
//! query name, attaching RRSIGs, resolving glue, and enforcing the
//! transport's size budget by trimming least-important sections first.

use std::collections::HashSet;

use nsd_database::{DomainId, Ndb, ZoneId};
use nsd_proto::op::Message;
use nsd_proto::rr::{Name, RData, Record, RecordType};
use nsd_proto::serialize::binary::encode_message;

use crate::config::Transport;

/// Tracks which `(domain, type)` RRsets have already been copied into a
/// response, so a name reachable by two paths (e.g. a CNAME target that is
/// also a glue host) is never duplicated.
#[derive(Default)]
pub struct Dedup(HashSet<(DomainId, RecordType)>);

impl Dedup {
    pub fn new() -> Self {
        Dedup::default()
    }

    fn mark(&mut self, domain: DomainId, rtype: RecordType) -> bool {
        self.0.insert((domain, rtype))
    }
}

fn rrsigs_covering(ndb: &Ndb, zone: ZoneId, domain: DomainId, covered: RecordType) -> Vec<&Record> {
    ndb.domain(domain)
        .find_rrset(zone, RecordType::RRSIG)
        .map(|rrset| {
            rrset
                .records()
                .iter()
                .filter(|r| matches!(r.rdata(), RData::Rrsig(sig) if sig.type_covered == covered))
                .collect()
        })
        .unwrap_or_default()
}

/// Copies `domain`'s RRset of `rtype` (plus its RRSIG, if `attach_rrsig`)
/// into `out` under `owner`. A no-op if this `(domain, rtype)` pair was
/// already added, or if the RRset doesn't exist.
pub fn add_rrset(
    ndb: &Ndb,
    zone: ZoneId,
    domain: DomainId,
    rtype: RecordType,
    owner: &Name,
    out: &mut Vec<Record>,
    dedup: &mut Dedup,
    attach_rrsig: bool,
) {
    if !dedup.mark(domain, rtype) {
        return;
    }
    let Some(rrset) = ndb.domain(domain).find_rrset(zone, rtype) else {
        return;
    };
    for record in rrset.records() {
        out.push(Record::new(owner.clone(), record.dns_class(), record.ttl(), record.rdata().clone()));
    }
    if attach_rrsig {
        for sig in rrsigs_covering(ndb, zone, domain, rtype) {
            out.push(Record::new(owner.clone(), sig.dns_class(), sig.ttl(), sig.rdata().clone()));
        }
    }
}

/// Appends a record to `authorities`/proof sections only if an
/// owner+type+rdata match isn't already present — NSEC3 proofs can
/// legitimately coincide (e.g. the closest-encloser proof and the
/// wildcard-denial proof are sometimes the same RR).
pub fn push_unique(out: &mut Vec<Record>, record: Record) {
    let dup = out
        .iter()
        .any(|r| r.name() == record.name() && r.record_type() == record.record_type() && r.rdata() == record.rdata());
    if !dup {
        out.push(record);
    }
}

/// Scans `answer` and `authority` for NS/MX/SRV targets and, for any target
/// that resolves exactly within a zone this server is authoritative for,
/// copies its A/AAAA RRsets into `additional` (`spec.md` section 4.3 step
/// 5's glue rule).
pub fn add_glue(
    ndb: &Ndb,
    dnssec_ok: bool,
    answer: &[Record],
    authority: &[Record],
    additional: &mut Vec<Record>,
    dedup: &mut Dedup,
) {
    let mut targets = Vec::new();
    for record in answer.iter().chain(authority.iter()) {
        if let Some(target) = record.rdata().glue_target() {
            targets.push(target.clone());
        }
    }
    for target in targets {
        let lookup = ndb.lookup(&target);
        if !lookup.exact {
            continue;
        }
        let Some(target_zone) = ndb.find_zone_for(&target) else {
            continue;
        };
        let attach_rrsig = dnssec_ok && ndb.zone(target_zone).is_secure();
        for rtype in [RecordType::A, RecordType::AAAA] {
            add_rrset(ndb, target_zone, lookup.closest_encloser, rtype, &target, additional, dedup, attach_rrsig);
        }
    }
}

/// Enforces `budget` by re-encoding and, if over, clearing the header's
/// truncated bit on success or else dropping Additional and then Authority
/// records one at a time (`spec.md` section 4.3 step 5). The Answer section
/// is never trimmed: a client that receives a truncated answer retries over
/// TCP rather than act on a partial one.
pub fn enforce_truncation(response: &mut Message, budget: usize) {
    if fits(response, budget) {
        return;
    }
    response.header.truncated = true;
    while !response.additionals.is_empty() {
        response.additionals.pop();
        if fits(response, budget) {
            return;
        }
    }
    while !response.authorities.is_empty() {
        response.authorities.pop();
        if fits(response, budget) {
            return;
        }
    }
}

fn fits(response: &Message, budget: usize) -> bool {
    encode_message(response).map(|bytes| bytes.len() <= budget).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsd_database::Ndb as NdbImpl;
    use nsd_proto::rr::{rdata::Soa, DNSClass};
    use std::net::Ipv4Addr;

    fn soa_record(owner: &Name) -> Record {
        Record::new(
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

    #[test]
    fn add_rrset_is_idempotent_per_domain_and_type() {
        let mut ndb = NdbImpl::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        let apex_id = ndb.zone(zone).apex();
        ndb.add_record(apex_id, zone, soa_record(&apex));

        let mut out = Vec::new();
        let mut dedup = Dedup::new();
        add_rrset(&ndb, zone, apex_id, RecordType::SOA, &apex, &mut out, &mut dedup, false);
        add_rrset(&ndb, zone, apex_id, RecordType::SOA, &apex, &mut out, &mut dedup, false);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn glue_is_added_for_an_in_zone_ns_target() {
        let mut ndb = NdbImpl::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        let apex_id = ndb.zone(zone).apex();
        ndb.add_record(apex_id, zone, soa_record(&apex));

        let cut = Name::parse("sub.example.com.", None).unwrap();
        let ns_target = Name::parse("ns1.sub.example.com.", None).unwrap();
        let cut_id = ndb.insert_domain(cut.clone());
        ndb.add_record(cut_id, zone, Record::new(cut.clone(), DNSClass::IN, 3600, RData::Ns(ns_target.clone())));
        let ns_id = ndb.insert_domain(ns_target.clone());
        ndb.add_record(ns_id, zone, Record::new(ns_target.clone(), DNSClass::IN, 3600, RData::A(Ipv4Addr::new(192, 0, 2, 1))));

        let authority = vec![ndb.domain(cut_id).find_rrset(zone, RecordType::NS).unwrap().records()[0].clone()];
        let mut additional = Vec::new();
        let mut dedup = Dedup::new();
        add_glue(&ndb, false, &[], &authority, &mut additional, &mut dedup);
        assert_eq!(additional.len(), 1);
        assert_eq!(additional[0].record_type(), RecordType::A);
    }
}
