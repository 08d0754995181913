//! RR type codes relevant to the authoritative core. Mirrors
//! `hickory-proto::rr::RecordType` in spirit: a closed enum for the types
//! this server understands natively, with `Unknown` carrying the raw code
//! for types we only need to store and transfer opaquely.

use std::fmt;

use crate::error::{ProtoError, ProtoResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    MX,
    TXT,
    AAAA,
    SRV,
    OPT,
    DS,
    RRSIG,
    NSEC,
    DNSKEY,
    NSEC3,
    NSEC3PARAM,
    TSIG,
    AXFR,
    IXFR,
    ANY,
    Unknown(u16),
}

impl RecordType {
    pub fn to_u16(self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::PTR => 12,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::SRV => 33,
            RecordType::OPT => 41,
            RecordType::DS => 43,
            RecordType::RRSIG => 46,
            RecordType::NSEC => 47,
            RecordType::DNSKEY => 48,
            RecordType::NSEC3 => 50,
            RecordType::NSEC3PARAM => 51,
            RecordType::TSIG => 250,
            RecordType::IXFR => 251,
            RecordType::AXFR => 252,
            RecordType::ANY => 255,
            RecordType::Unknown(v) => v,
        }
    }

    pub fn from_u16(v: u16) -> Self {
        match v {
            1 => RecordType::A,
            2 => RecordType::NS,
            5 => RecordType::CNAME,
            6 => RecordType::SOA,
            12 => RecordType::PTR,
            15 => RecordType::MX,
            16 => RecordType::TXT,
            28 => RecordType::AAAA,
            33 => RecordType::SRV,
            41 => RecordType::OPT,
            43 => RecordType::DS,
            46 => RecordType::RRSIG,
            47 => RecordType::NSEC,
            48 => RecordType::DNSKEY,
            50 => RecordType::NSEC3,
            51 => RecordType::NSEC3PARAM,
            250 => RecordType::TSIG,
            251 => RecordType::IXFR,
            252 => RecordType::AXFR,
            255 => RecordType::ANY,
            other => RecordType::Unknown(other),
        }
    }

    /// Meta-types that never appear as a stored RRset type.
    pub fn is_meta(self) -> bool {
        matches!(
            self,
            RecordType::OPT
                | RecordType::TSIG
                | RecordType::AXFR
                | RecordType::IXFR
                | RecordType::ANY
        )
    }

    pub fn is_cname(self) -> bool {
        matches!(self, RecordType::CNAME)
    }
}

impl TryFrom<u16> for RecordType {
    type Error = ProtoError;

    fn try_from(v: u16) -> ProtoResult<Self> {
        Ok(RecordType::from_u16(v))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::Unknown(v) => write!(f, "TYPE{v}"),
            other => write!(f, "{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_u16() {
        for t in [
            RecordType::A,
            RecordType::NS,
            RecordType::SOA,
            RecordType::NSEC3,
            RecordType::NSEC3PARAM,
            RecordType::RRSIG,
            RecordType::DS,
        ] {
            assert_eq!(RecordType::from_u16(t.to_u16()), t);
        }
        assert_eq!(RecordType::from_u16(9999), RecordType::Unknown(9999));
    }
}
