//! The structured configuration this core consumes: per-zone master
//! lists, TSIG keys, and resolver/XFR timing constants. This is the
//! parsed, typed *result* of loading a configuration file — the text
//! format itself stays out of scope, the same way the zone-file text
//! parser does. NSEC3 parameters are never configured externally: the
//! zone-loader reads them back out of the zone's own apex NSEC3 record
//! (`loader::find_zone_nsec3_param`), matching a pre-signed zone the way
//! NSD's `nsec3.c` does.

use nsd_proto::rr::Name;
use nsd_resolver::ResolverConfig;
use nsd_xfr::config::ZoneXfrConfig;

#[derive(Debug, Clone)]
pub struct ZoneConfig {
    pub apex: Name,
    pub xfr: ZoneXfrConfig,
}

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub resolver: ResolverConfig,
    pub zones: Vec<ZoneConfig>,
}

impl CoreConfig {
    pub fn zone(&self, apex: &Name) -> Option<&ZoneConfig> {
        self.zones.iter().find(|z| &z.apex == apex)
    }
}
