//! Knobs the pipeline needs that `spec.md` section 4.3 leaves to
//! configuration: the CNAME-chase depth limit and stub-delegate behavior
//! when no authoritative zone covers the query name.

/// How the response is being carried, which bounds the size budget used
/// for truncation decisions (`spec.md` section 4.3 step 5).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transport {
    /// `edns_bufsize` is the advertised OPT payload size, or `None` for a
    /// plain (non-EDNS) UDP query, which falls back to 512.
    Udp { edns_bufsize: Option<u16> },
    Tcp,
}

impl Transport {
    pub fn size_budget(self) -> usize {
        match self {
            Transport::Udp { edns_bufsize } => edns_bufsize.unwrap_or(512) as usize,
            Transport::Tcp => 65535,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Maximum number of CNAME hops followed within one zone before the
    /// resolver gives up and returns whatever chain was assembled so far.
    pub cname_chase_limit: usize,
    /// When no configured zone covers the query name: `true` answers
    /// `REFUSED` (the default, matching an authoritative-only deployment
    /// with no configured stub); `false` is reserved for an embedder that
    /// wires in a stub-delegate policy of its own.
    pub refuse_when_no_zone: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            cname_chase_limit: 8,
            refuse_when_no_zone: true,
        }
    }
}
