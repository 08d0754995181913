//! A zone: an apex domain plus the bookkeeping NSD's `struct zone` keeps
//! alongside it (SOA/NS shortcuts, security status).

use nsd_proto::rr::rdata::{Nsec3Param, Soa};
use nsd_proto::Serial;

use crate::domain::DomainId;
use crate::region::RegionId;

pub type ZoneId = RegionId<Zone>;

#[derive(Debug, Clone)]
pub struct Zone {
    apex: DomainId,
    number: u32,
    /// Set once DNSSEC records (NSEC3PARAM at the apex) are observed and
    /// `nsec3::prehash_zone` has run for this zone.
    is_secure: bool,
    nsec3_param: Option<Nsec3Param>,
}

impl Zone {
    pub fn new(apex: DomainId, number: u32) -> Self {
        Zone {
            apex,
            number,
            is_secure: false,
            nsec3_param: None,
        }
    }

    pub fn apex(&self) -> DomainId {
        self.apex
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn is_secure(&self) -> bool {
        self.is_secure
    }

    pub fn nsec3_param(&self) -> Option<&Nsec3Param> {
        self.nsec3_param.as_ref()
    }

    pub fn set_nsec3_param(&mut self, param: Option<Nsec3Param>) {
        self.is_secure = param.is_some();
        self.nsec3_param = param;
    }
}

/// Reads the SOA serial out of an apex RRset's sole record, for freshness
/// comparisons in the XFR coordinator.
pub fn soa_serial(soa: &Soa) -> Serial {
    Serial::new(soa.serial)
}
