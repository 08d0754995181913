//! RDATA: the structured payload of a resource record.
//!
//! Per `SPEC_FULL.md` section 3/9, each RDATA slot that names another
//! domain is represented as its own `Name` field rather than an opaque
//! byte blob, so the resolver can find glue targets and the NSEC3 engine
//! can walk DS/DNSKEY fields without re-parsing wire bytes. Types this
//! server does not need to interpret are kept as `Unknown`, a
//! length-prefixed byte string — the "tagged variant, not a union of raw
//! pointers" design note from `spec.md` section 9.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::rr::domain::Name;
use crate::rr::record_type::RecordType;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Soa {
    pub mname: Name,
    pub rname: Name,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Srv {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: Name,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mx {
    pub preference: u16,
    pub exchange: Name,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ds {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: Box<[u8]>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rrsig {
    pub type_covered: RecordType,
    pub algorithm: u8,
    pub labels: u8,
    pub original_ttl: u32,
    pub sig_expiration: u32,
    pub sig_inception: u32,
    pub key_tag: u16,
    pub signer_name: Name,
    pub signature: Box<[u8]>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dnskey {
    pub zone_key: bool,
    pub secure_entry_point: bool,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Box<[u8]>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nsec {
    pub next_domain_name: Name,
    pub type_bit_maps: TypeBitMaps,
}

/// NSEC3 flags bit 7, "Opt-Out", per RFC 5155 section 3.1.2.1.
pub const NSEC3_OPT_OUT: u8 = 0x01;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nsec3 {
    pub hash_algorithm: u8,
    pub flags: u8,
    pub iterations: u16,
    pub salt: Box<[u8]>,
    /// Raw (binary, not base32hex) next hashed owner name.
    pub next_hashed_owner: Box<[u8]>,
    pub type_bit_maps: TypeBitMaps,
}

impl Nsec3 {
    pub fn opt_out(&self) -> bool {
        self.flags & NSEC3_OPT_OUT != 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nsec3Param {
    pub hash_algorithm: u8,
    pub flags: u8,
    pub iterations: u16,
    pub salt: Box<[u8]>,
}

/// RFC 4034 section 4.1 type bitmap: a sparse set of `RecordType`s, stored
/// in its decoded (sorted, deduplicated) form so membership tests and
/// re-encoding are both cheap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeBitMaps {
    types: Vec<u16>,
}

impl TypeBitMaps {
    pub fn from_types(mut types: Vec<RecordType>) -> Self {
        types.sort_by_key(|t| t.to_u16());
        types.dedup();
        TypeBitMaps {
            types: types.into_iter().map(RecordType::to_u16).collect(),
        }
    }

    pub fn contains(&self, t: RecordType) -> bool {
        self.types.binary_search(&t.to_u16()).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = RecordType> + '_ {
        self.types.iter().map(|&v| RecordType::from_u16(v))
    }

    /// Encodes as the windowed bitmap format shared by NSEC and NSEC3.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < self.types.len() {
            let window = (self.types[i] >> 8) as u8;
            let mut bitmap = [0u8; 32];
            let mut max_bit = 0usize;
            while i < self.types.len() && (self.types[i] >> 8) as u8 == window {
                let bit = (self.types[i] & 0xff) as usize;
                bitmap[bit / 8] |= 0x80 >> (bit % 8);
                max_bit = max_bit.max(bit);
                i += 1;
            }
            let len = max_bit / 8 + 1;
            out.push(window);
            out.push(len as u8);
            out.extend_from_slice(&bitmap[..len]);
        }
        out
    }

    pub fn from_wire(bytes: &[u8]) -> Self {
        let mut types = Vec::new();
        let mut i = 0;
        while i + 2 <= bytes.len() {
            let window = bytes[i] as u16;
            let len = bytes[i + 1] as usize;
            i += 2;
            if i + len > bytes.len() {
                break;
            }
            for (byte_idx, &byte) in bytes[i..i + len].iter().enumerate() {
                for bit in 0..8 {
                    if byte & (0x80 >> bit) != 0 {
                        types.push((window << 8) | ((byte_idx * 8 + bit) as u16));
                    }
                }
            }
            i += len;
        }
        TypeBitMaps { types }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    Ns(Name),
    Cname(Name),
    Ptr(Name),
    Soa(Soa),
    Mx(Mx),
    Srv(Srv),
    Txt(Vec<Box<[u8]>>),
    Ds(Ds),
    Rrsig(Rrsig),
    Nsec(Nsec),
    Dnskey(Dnskey),
    Nsec3(Nsec3),
    Nsec3Param(Nsec3Param),
    /// Any RR type this core does not interpret: stored and transferred
    /// verbatim as its wire-format rdata bytes.
    Unknown { rtype: RecordType, data: Box<[u8]> },
}

impl RData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RData::A(_) => RecordType::A,
            RData::AAAA(_) => RecordType::AAAA,
            RData::Ns(_) => RecordType::NS,
            RData::Cname(_) => RecordType::CNAME,
            RData::Ptr(_) => RecordType::PTR,
            RData::Soa(_) => RecordType::SOA,
            RData::Mx(_) => RecordType::MX,
            RData::Srv(_) => RecordType::SRV,
            RData::Txt(_) => RecordType::TXT,
            RData::Ds(_) => RecordType::DS,
            RData::Rrsig(_) => RecordType::RRSIG,
            RData::Nsec(_) => RecordType::NSEC,
            RData::Dnskey(_) => RecordType::DNSKEY,
            RData::Nsec3(_) => RecordType::NSEC3,
            RData::Nsec3Param(_) => RecordType::NSEC3PARAM,
            RData::Unknown { rtype, .. } => *rtype,
        }
    }

    /// Name(s) embedded in this RDATA that a client may need glue for
    /// (NS/MX/SRV targets). Used by the resolver to populate Additional.
    pub fn glue_target(&self) -> Option<&Name> {
        match self {
            RData::Ns(n) => Some(n),
            RData::Mx(mx) => Some(&mx.exchange),
            RData::Srv(srv) => Some(&srv.target),
            _ => None,
        }
    }

    pub fn cname_target(&self) -> Option<&Name> {
        match self {
            RData::Cname(n) => Some(n),
            _ => None,
        }
    }
}
