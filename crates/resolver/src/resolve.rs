//! The main query pipeline (`spec.md` section 4.3): header validation,
//! zone lookup, classification with CNAME chasing, section assembly, and
//! DNSSEC proof attachment gated on the request's DO bit.

use std::collections::HashSet;

use nsd_database::{DomainId, Ndb};
use nsd_proto::op::header::{OpCode, ResponseCode};
use nsd_proto::op::{Edns, Message};
use nsd_proto::rr::{Name, RecordType};

use crate::answer::{add_glue, add_rrset, enforce_truncation, push_unique, Dedup};
use crate::classify::{classify, find_authoritative_zone, Classification};
use crate::config::{ResolverConfig, Transport};
use crate::nsec3_proof;

/// Resolves queries against a single, already-loaded `Ndb` snapshot.
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Resolver { config }
    }

    /// Runs the full pipeline for one request. Returns `None` when the
    /// request must be dropped without a reply (it is itself a response, or
    /// not something the wire even allows a reply to).
    pub fn resolve(&self, ndb: &Ndb, request: &Message, transport: Transport) -> Option<Message> {
        if request.header.is_response {
            return None;
        }
        if request.header.op_code != OpCode::Query {
            return Some(Message::new_response(request, ResponseCode::NotImp));
        }
        if request.queries.len() != 1 {
            return Some(Message::new_response(request, ResponseCode::FormErr));
        }

        let query = &request.queries[0];
        if !query.query_class.is_supported() {
            return Some(Message::new_response(request, ResponseCode::Refused));
        }
        if matches!(query.query_type, RecordType::AXFR | RecordType::IXFR) && matches!(transport, Transport::Udp { .. }) {
            return Some(Message::new_response(request, ResponseCode::Refused));
        }

        let qname = &query.name;
        let qtype = query.query_type;
        let dnssec_ok = request.edns.as_ref().map(|e| e.dnssec_ok).unwrap_or(false);

        let Some(zone) = find_authoritative_zone(ndb, qname) else {
            // `refuse_when_no_zone` exists for an embedder that wires in its
            // own stub-delegate policy; this crate only implements the
            // authoritative-only default.
            debug_assert!(self.config.refuse_when_no_zone);
            let mut response = Message::new_response(request, ResponseCode::Refused);
            self.finish(request, &mut response, transport);
            return Some(response);
        };
        let zone_secure = ndb.zone(zone).is_secure();
        let sign = dnssec_ok && zone_secure;

        let mut response = Message::new_response(request, ResponseCode::NoError);
        response.header.authoritative = true;

        let mut dedup = Dedup::new();
        let mut visited: HashSet<(DomainId, RecordType)> = HashSet::new();
        let mut current_name = qname.clone();
        let mut hops = 0usize;
        let apex_name = ndb.domain(ndb.zone(zone).apex()).name().clone();

        let (classification, closest_encloser, answer_domain) = loop {
            let result = classify(ndb, zone, &current_name, qtype);
            match result.classification {
                Classification::Positive => {
                    add_rrset(ndb, zone, result.answer_domain, qtype, &current_name, &mut response.answers, &mut dedup, sign);
                    break (result.classification, result.closest_encloser, result.answer_domain);
                }
                Classification::Cname => {
                    if !visited.insert((result.answer_domain, RecordType::CNAME)) || hops >= self.config.cname_chase_limit {
                        break (result.classification, result.closest_encloser, result.answer_domain);
                    }
                    add_rrset(ndb, zone, result.answer_domain, RecordType::CNAME, &current_name, &mut response.answers, &mut dedup, sign);
                    let target = ndb
                        .domain(result.answer_domain)
                        .find_rrset(zone, RecordType::CNAME)
                        .and_then(|rrset| rrset.records().first())
                        .and_then(|record| record.rdata().cname_target().cloned());
                    match target {
                        Some(target) if target.is_subdomain(&apex_name) => {
                            current_name = target;
                            hops += 1;
                            continue;
                        }
                        // The chain leaves this zone, or the CNAME's rdata
                        // is malformed: stop with what's assembled so far
                        // and let the client re-query the target directly.
                        _ => break (result.classification, result.closest_encloser, result.answer_domain),
                    }
                }
                other => break (other, result.closest_encloser, result.answer_domain),
            }
        };

        match classification {
            Classification::Positive | Classification::Cname => {}
            Classification::NoData => {
                self.add_soa(ndb, zone, &mut response);
                if sign {
                    if let Some(rec) = nsec3_proof::nodata_proof(ndb, zone, answer_domain) {
                        push_unique(&mut response.authorities, rec);
                    }
                }
            }
            Classification::NoDataDs => {
                // The parent zone is authoritative for the question "does a
                // DS exist here", so this is a plain NODATA, not a referral.
                self.add_soa(ndb, zone, &mut response);
                if sign {
                    if let Some(rec) = nsec3_proof::referral_ds_proof(ndb, zone, answer_domain) {
                        push_unique(&mut response.authorities, rec);
                    }
                }
            }
            Classification::Referral => {
                response.header.authoritative = false;
                add_rrset(ndb, zone, answer_domain, RecordType::NS, &current_name, &mut response.authorities, &mut dedup, false);
                if sign {
                    if let Some(rec) = nsec3_proof::referral_ds_proof(ndb, zone, answer_domain) {
                        push_unique(&mut response.authorities, rec);
                    }
                }
            }
            Classification::Wildcard { wildcard_domain } => {
                add_rrset(ndb, zone, wildcard_domain, qtype, &current_name, &mut response.answers, &mut dedup, sign);
                if sign {
                    if let Some(rec) = nsec3_proof::wildcard_expansion_cover(ndb, zone, &current_name) {
                        push_unique(&mut response.authorities, rec);
                    }
                }
            }
            Classification::NxDomain => {
                response.header.response_code = ResponseCode::NXDomain;
                self.add_soa(ndb, zone, &mut response);
                if sign {
                    let encloser_name = ndb.domain(closest_encloser).name().clone();
                    for proof in [
                        nsec3_proof::closest_encloser_proof(ndb, zone, closest_encloser),
                        nsec3_proof::next_closer_cover(ndb, zone, &current_name, &encloser_name),
                        nsec3_proof::wildcard_denial(ndb, zone, closest_encloser),
                    ]
                    .into_iter()
                    .flatten()
                    {
                        push_unique(&mut response.authorities, proof);
                    }
                }
            }
        }

        let answer_snapshot = response.answers.clone();
        let authority_snapshot = response.authorities.clone();
        add_glue(ndb, dnssec_ok, &answer_snapshot, &authority_snapshot, &mut response.additionals, &mut dedup);

        self.finish(request, &mut response, transport);
        Some(response)
    }

    fn add_soa(&self, ndb: &Ndb, zone: nsd_database::ZoneId, response: &mut Message) {
        if let Some(soa) = ndb.zone_soa(zone) {
            response.authorities.push(soa.clone());
        }
    }

    fn finish(&self, request: &Message, response: &mut Message, transport: Transport) {
        if let Some(req_edns) = &request.edns {
            response.edns = Some(Edns::new(req_edns.max_payload, false));
        }
        enforce_truncation(response, transport.size_budget());
        response.finalize_counts();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsd_proto::op::Query;
    use nsd_proto::rr::rdata::Soa;
    use nsd_proto::rr::{DNSClass, RData};
    use std::net::Ipv4Addr;

    fn base_ndb() -> (Ndb, nsd_database::ZoneId) {
        let mut ndb = Ndb::new();
        let apex = Name::parse("example.com.", None).unwrap();
        let zone = ndb.add_zone(apex.clone()).unwrap();
        let apex_id = ndb.zone(zone).apex();
        ndb.add_record(
            apex_id,
            zone,
            nsd_proto::rr::Record::new(
                apex.clone(),
                DNSClass::IN,
                3600,
                RData::Soa(Soa {
                    mname: Name::parse("ns1", Some(&apex)).unwrap(),
                    rname: Name::parse("hostmaster", Some(&apex)).unwrap(),
                    serial: 1,
                    refresh: 1,
                    retry: 1,
                    expire: 1,
                    minimum: 1,
                }),
            ),
        );
        (ndb, zone)
    }

    fn query(name: &Name, rtype: RecordType) -> Message {
        Message::new_query(1, Query::new(name.clone(), rtype, DNSClass::IN))
    }

    #[test]
    fn apex_a_record_is_answered_positively() {
        let (mut ndb, zone) = base_ndb();
        let apex = ndb.domain(ndb.zone(zone).apex()).name().clone();
        let apex_id = ndb.zone(zone).apex();
        ndb.add_record(apex_id, zone, nsd_proto::rr::Record::new(apex.clone(), DNSClass::IN, 3600, RData::A(Ipv4Addr::new(192, 0, 2, 1))));

        let resolver = Resolver::new(ResolverConfig::default());
        let request = query(&apex, RecordType::A);
        let response = resolver.resolve(&ndb, &request, Transport::Tcp).unwrap();
        assert_eq!(response.header.response_code, ResponseCode::NoError);
        assert!(response.header.authoritative);
        assert_eq!(response.answers.len(), 1);
    }

    #[test]
    fn missing_name_is_nxdomain_with_soa_authority() {
        let (ndb, _zone) = base_ndb();
        let resolver = Resolver::new(ResolverConfig::default());
        let missing = Name::parse("nope.example.com.", None).unwrap();
        let request = query(&missing, RecordType::A);
        let response = resolver.resolve(&ndb, &request, Transport::Tcp).unwrap();
        assert_eq!(response.header.response_code, ResponseCode::NXDomain);
        assert_eq!(response.authorities.len(), 1);
        assert_eq!(response.authorities[0].record_type(), RecordType::SOA);
    }

    #[test]
    fn cname_chain_is_followed_within_the_zone() {
        let (mut ndb, zone) = base_ndb();
        let alias = Name::parse("alias.example.com.", None).unwrap();
        let target = Name::parse("target.example.com.", None).unwrap();
        let alias_id = ndb.insert_domain(alias.clone());
        ndb.add_record(alias_id, zone, nsd_proto::rr::Record::new(alias.clone(), DNSClass::IN, 3600, RData::Cname(target.clone())));
        let target_id = ndb.insert_domain(target.clone());
        ndb.add_record(target_id, zone, nsd_proto::rr::Record::new(target.clone(), DNSClass::IN, 3600, RData::A(Ipv4Addr::new(192, 0, 2, 2))));

        let resolver = Resolver::new(ResolverConfig::default());
        let request = query(&alias, RecordType::A);
        let response = resolver.resolve(&ndb, &request, Transport::Tcp).unwrap();
        assert_eq!(response.header.response_code, ResponseCode::NoError);
        assert_eq!(response.answers.len(), 2);
        assert_eq!(response.answers[0].record_type(), RecordType::CNAME);
        assert_eq!(response.answers[1].record_type(), RecordType::A);
    }

    #[test]
    fn a_response_to_a_response_is_dropped() {
        let (ndb, _zone) = base_ndb();
        let resolver = Resolver::new(ResolverConfig::default());
        let mut request = query(&Name::parse("example.com.", None).unwrap(), RecordType::A);
        request.header.is_response = true;
        assert!(resolver.resolve(&ndb, &request, Transport::Tcp).is_none());
    }

    #[test]
    fn non_exact_query_under_a_wildcard_is_expanded() {
        let (mut ndb, zone) = base_ndb();
        let wildcard = Name::parse("*.w.example.com.", None).unwrap();
        let wid = ndb.insert_domain(wildcard.clone());
        ndb.add_record(wid, zone, nsd_proto::rr::Record::new(wildcard, DNSClass::IN, 3600, RData::A(Ipv4Addr::new(192, 0, 2, 4))));

        let resolver = Resolver::new(ResolverConfig::default());
        let query_name = Name::parse("a.w.example.com.", None).unwrap();
        let request = query(&query_name, RecordType::A);
        let response = resolver.resolve(&ndb, &request, Transport::Tcp).unwrap();
        assert_eq!(response.header.response_code, ResponseCode::NoError);
        assert_eq!(response.answers.len(), 1);
        // the owner name in the answer is the literal query name, not the
        // wildcard label itself.
        assert_eq!(response.answers[0].name(), &query_name);
    }

    #[test]
    fn ds_query_at_a_cut_is_answered_authoritatively_with_soa() {
        let (mut ndb, zone) = base_ndb();
        let cut = Name::parse("sub.example.com.", None).unwrap();
        let ns_name = Name::parse("ns1.sub.example.com.", None).unwrap();
        let cut_id = ndb.insert_domain(cut.clone());
        ndb.add_record(cut_id, zone, nsd_proto::rr::Record::new(cut.clone(), DNSClass::IN, 3600, RData::Ns(ns_name)));

        let resolver = Resolver::new(ResolverConfig::default());
        let request = query(&cut, RecordType::DS);
        let response = resolver.resolve(&ndb, &request, Transport::Tcp).unwrap();
        assert!(response.header.authoritative);
        assert_eq!(response.header.response_code, ResponseCode::NoError);
        assert_eq!(response.authorities[0].record_type(), RecordType::SOA);
    }

    #[test]
    fn referral_clears_the_authoritative_bit_and_adds_glue() {
        let (mut ndb, zone) = base_ndb();
        let cut = Name::parse("sub.example.com.", None).unwrap();
        let ns_name = Name::parse("ns1.sub.example.com.", None).unwrap();
        let cut_id = ndb.insert_domain(cut.clone());
        ndb.add_record(cut_id, zone, nsd_proto::rr::Record::new(cut.clone(), DNSClass::IN, 3600, RData::Ns(ns_name.clone())));
        let ns_id = ndb.insert_domain(ns_name.clone());
        ndb.add_record(ns_id, zone, nsd_proto::rr::Record::new(ns_name.clone(), DNSClass::IN, 3600, RData::A(Ipv4Addr::new(192, 0, 2, 3))));

        let resolver = Resolver::new(ResolverConfig::default());
        let request = query(&cut, RecordType::A);
        let response = resolver.resolve(&ndb, &request, Transport::Tcp).unwrap();
        assert!(!response.header.authoritative);
        assert_eq!(response.authorities[0].record_type(), RecordType::NS);
        assert_eq!(response.additionals.len(), 1);
    }
}
