use std::fmt;
use std::net::Ipv4Addr;

/// One hostname → address answer from forward resolution.
///
/// A hostname with several A records yields several pairs. Ordering is by
/// hostname, then address, so sets of pairs persist deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolvedPair {
    pub hostname: String,
    pub addr: Ipv4Addr,
}

impl ResolvedPair {
    pub fn new(hostname: impl Into<String>, addr: Ipv4Addr) -> Self {
        Self {
            hostname: hostname.into(),
            addr,
        }
    }
}

impl fmt::Display for ResolvedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.hostname, self.addr)
    }
}
