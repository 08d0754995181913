//! NSEC3 denial-proof assembly (`spec.md` section 4.2 "Proof assembly"),
//! built from the precomputed cover/exact pointers `nsd_database::nsec3`
//! attaches to every domain at load time, plus one on-demand hash for
//! names that are not themselves in the tree (the NXDOMAIN "next closer
//! name" and a non-exact wildcard query name).

use nsd_database::{DomainId, Ndb, ZoneId};
use nsd_proto::rr::{Name, Record, RecordType};

fn nsec3_record_at(ndb: &Ndb, zone: ZoneId, domain: DomainId) -> Option<Record> {
    ndb.domain(domain)
        .find_rrset(zone, RecordType::NSEC3)
        .and_then(|rrset| rrset.records().first())
        .cloned()
}

/// The NSEC3 RR proving `closest_encloser` itself exists — its own
/// precomputed `cover`, which should be an exact hash match whenever the
/// zone is correctly signed.
pub fn closest_encloser_proof(ndb: &Ndb, zone: ZoneId, closest_encloser: DomainId) -> Option<Record> {
    let pointer = ndb.domain(closest_encloser).nsec3.cover?;
    nsec3_record_at(ndb, zone, pointer)
}

/// The name one label below `closest_encloser` along `qname`'s path — the
/// "next closer name" whose NSEC3 cover denies any direct child of the
/// encloser matching the query.
pub fn next_closer_name(qname: &Name, closest_encloser: &Name) -> Name {
    let strip = qname.label_count() - (closest_encloser.label_count() + 1);
    qname.strip_leading(strip)
}

/// NXDOMAIN's second proof: the cover for the next-closer name. This name
/// is not in the tree (the query doesn't exist), so it is hashed on demand
/// rather than read off a precomputed pointer.
pub fn next_closer_cover(ndb: &Ndb, zone: ZoneId, qname: &Name, closest_encloser_name: &Name) -> Option<Record> {
    let target = next_closer_name(qname, closest_encloser_name);
    let (domain, _exact) = nsd_database::nsec3::find_cover_for_name(ndb, zone, &target)?;
    nsec3_record_at(ndb, zone, domain)
}

/// NXDOMAIN's third proof, and the proof attached to a wildcard-expanded
/// answer: the cover denying `*.closest_encloser`, read off the encloser's
/// precomputed `wildcard_cover` pointer.
pub fn wildcard_denial(ndb: &Ndb, zone: ZoneId, closest_encloser: DomainId) -> Option<Record> {
    let pointer = ndb.domain(closest_encloser).nsec3.wildcard_cover?;
    nsec3_record_at(ndb, zone, pointer)
}

/// NODATA's single proof: the NSEC3 matching the queried (existing) name.
pub fn nodata_proof(ndb: &Ndb, zone: ZoneId, domain: DomainId) -> Option<Record> {
    closest_encloser_proof(ndb, zone, domain)
}

/// The DS-denial proof at a delegation point: an exact-match NSEC3 (its
/// type bitmap omitting DS proves it directly) when one was hashed, else
/// the covering NSEC3 (opt-out or plain absence). Used both for the
/// optional proof attached to an ordinary referral and for the dedicated
/// NODATA(DS) answer a `DS` query at the cut gets instead of a referral.
pub fn referral_ds_proof(ndb: &Ndb, zone: ZoneId, delegation_point: DomainId) -> Option<Record> {
    let pointers = ndb.domain(delegation_point).nsec3;
    let pointer = pointers.ds_parent_exact.or(pointers.ds_parent_cover)?;
    nsec3_record_at(ndb, zone, pointer)
}

/// The cover proving the literal query name would have been denied, were
/// it not for the wildcard expansion — hashed on demand since the query
/// name (unlike the wildcard owner) is not itself in the tree.
pub fn wildcard_expansion_cover(ndb: &Ndb, zone: ZoneId, qname: &Name) -> Option<Record> {
    let (domain, _exact) = nsd_database::nsec3::find_cover_for_name(ndb, zone, qname)?;
    nsec3_record_at(ndb, zone, domain)
}
