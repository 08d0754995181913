//! DNS query/RR classes.

use std::fmt;

use crate::error::{ProtoError, ProtoResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DNSClass {
    IN,
    CH,
    HS,
    ANY,
    NONE,
    Unknown(u16),
}

impl DNSClass {
    pub fn to_u16(self) -> u16 {
        match self {
            DNSClass::IN => 1,
            DNSClass::CH => 3,
            DNSClass::HS => 4,
            DNSClass::NONE => 254,
            DNSClass::ANY => 255,
            DNSClass::Unknown(v) => v,
        }
    }

    pub fn from_u16(v: u16) -> Self {
        match v {
            1 => DNSClass::IN,
            3 => DNSClass::CH,
            4 => DNSClass::HS,
            254 => DNSClass::NONE,
            255 => DNSClass::ANY,
            other => DNSClass::Unknown(other),
        }
    }

    /// Whether this class is one the resolver is willing to answer for.
    /// `ANY` is accepted on the wire per RFC 1035 section 3.2.5's QCLASS
    /// semantics, matching `spec.md` section 4.3 step 1.
    pub fn is_supported(self) -> bool {
        matches!(self, DNSClass::IN | DNSClass::ANY)
    }
}

impl TryFrom<u16> for DNSClass {
    type Error = ProtoError;

    fn try_from(v: u16) -> ProtoResult<Self> {
        Ok(DNSClass::from_u16(v))
    }
}

impl fmt::Display for DNSClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DNSClass::Unknown(v) => write!(f, "CLASS{v}"),
            other => write!(f, "{:?}", other),
        }
    }
}
