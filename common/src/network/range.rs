//! # IPv4 Range Model
//!
//! Contiguous, inclusive ranges of IPv4 addresses. Every CIDR entry in a scope
//! file becomes one of these before it is expanded into an
//! [`AddressSet`](crate::network::address::AddressSet).

use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;

use crate::error::ParseError;

/// Represents a continuous range of IPv4 addresses, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    /// Walks every address in the range, network and broadcast included.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Ipv4Addr> + Clone {
        let start: u32 = u32::from(self.start_addr);
        let end: u32 = u32::from(self.end_addr);
        (start..=end).map(Ipv4Addr::from)
    }

    pub fn len(&self) -> u64 {
        let start: u32 = u32::from(self.start_addr);
        let end: u32 = u32::from(self.end_addr);
        if end < start {
            return 0;
        }
        u64::from(end - start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, addr: &Ipv4Addr) -> bool {
        (self.start_addr..=self.end_addr).contains(addr)
    }
}

impl From<Ipv4Network> for Ipv4Range {
    /// Network through broadcast, whatever host bits the network was built with.
    fn from(net: Ipv4Network) -> Self {
        Self::new(net.network(), net.broadcast())
    }
}

/// Creates a range from an IP and a CIDR prefix (e.g., 192.168.1.0/24).
///
/// Host bits in `ip` are masked off, so `10.0.0.7/30` covers `10.0.0.4-10.0.0.7`.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> Result<Ipv4Range, ParseError> {
    Ipv4Network::new(ip, prefix)
        .map(Ipv4Range::from)
        .map_err(|_| ParseError::PrefixTooLong {
            token: format!("{ip}/{prefix}"),
            prefix: u32::from(prefix),
        })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidr_range_covers_network_and_broadcast() {
        let range = cidr_range(Ipv4Addr::new(10, 0, 0, 0), 30).unwrap();
        assert_eq!(range.start_addr, Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(range.end_addr, Ipv4Addr::new(10, 0, 0, 3));

        let addrs: Vec<Ipv4Addr> = range.iter().collect();
        assert_eq!(addrs.len(), 4);
        assert_eq!(addrs.first(), Some(&Ipv4Addr::new(10, 0, 0, 0)));
        assert_eq!(addrs.last(), Some(&Ipv4Addr::new(10, 0, 0, 3)));
    }

    #[test]
    fn cidr_range_size_matches_prefix() {
        for prefix in 16..=32u8 {
            let range = cidr_range(Ipv4Addr::new(172, 16, 0, 0), prefix).unwrap();
            let expected: u64 = 1 << (32 - u32::from(prefix));
            assert_eq!(range.len(), expected, "prefix /{prefix}");
            assert_eq!(range.iter().count() as u64, expected, "prefix /{prefix}");
            assert!(range.iter().all(|addr| range.contains(&addr)));
        }
    }

    #[test]
    fn cidr_range_masks_host_bits() {
        let range = cidr_range(Ipv4Addr::new(192, 168, 1, 77), 24).unwrap();
        assert_eq!(range.start_addr, Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(range.end_addr, Ipv4Addr::new(192, 168, 1, 255));
    }

    #[test]
    fn cidr_range_edges() {
        let single = cidr_range(Ipv4Addr::new(8, 8, 8, 8), 32).unwrap();
        assert_eq!(single.len(), 1);

        let everything = cidr_range(Ipv4Addr::new(1, 2, 3, 4), 0).unwrap();
        assert_eq!(everything.start_addr, Ipv4Addr::UNSPECIFIED);
        assert_eq!(everything.end_addr, Ipv4Addr::BROADCAST);
        assert_eq!(everything.len(), 1u64 << 32);

        assert!(matches!(
            cidr_range(Ipv4Addr::new(10, 0, 0, 0), 33),
            Err(ParseError::PrefixTooLong { prefix: 33, .. })
        ));
    }

    #[test]
    fn range_from_network_ignores_host_bits() {
        let net = Ipv4Network::new(Ipv4Addr::new(10, 0, 0, 7), 30).unwrap();
        let range = Ipv4Range::from(net);
        assert_eq!(range, Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 4), Ipv4Addr::new(10, 0, 0, 7)));
    }
}
