//! A single resource record: owner name, type/class, TTL and RDATA.

use crate::rr::dns_class::DNSClass;
use crate::rr::domain::Name;
use crate::rr::rdata::RData;
use crate::rr::record_type::RecordType;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    name: Name,
    dns_class: DNSClass,
    ttl: u32,
    rdata: RData,
}

impl Record {
    pub fn new(name: Name, dns_class: DNSClass, ttl: u32, rdata: RData) -> Self {
        Record {
            name,
            dns_class,
            ttl,
            rdata,
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn record_type(&self) -> RecordType {
        self.rdata.record_type()
    }

    pub fn dns_class(&self) -> DNSClass {
        self.dns_class
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn set_ttl(&mut self, ttl: u32) {
        self.ttl = ttl;
    }

    pub fn rdata(&self) -> &RData {
        &self.rdata
    }

    pub fn into_rdata(self) -> RData {
        self.rdata
    }
}
