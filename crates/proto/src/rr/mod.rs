//! Resource-record types: names, classes, record types, RDATA and the
//! assembled `Record`.

pub mod dns_class;
pub mod domain;
pub mod rdata;
pub mod record;
pub mod record_type;

pub use dns_class::DNSClass;
pub use domain::{Label, Name};
pub use rdata::RData;
pub use record::Record;
pub use record_type::RecordType;
