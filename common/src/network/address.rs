use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use rayon::prelude::*;

use crate::network::range::Ipv4Range;

/// The concrete scope boundary: every bare IP and every address of every CIDR
/// range named in the scope file.
///
/// Grows monotonically. Iteration is sorted, which keeps persisted output
/// stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSet {
    addrs: BTreeSet<Ipv4Addr>,
}

impl AddressSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_single(&mut self, addr: Ipv4Addr) -> bool {
        self.addrs.insert(addr)
    }

    pub fn add_range(&mut self, range: Ipv4Range) {
        self.addrs.extend(range.iter());
    }

    /// Expands several ranges at once on the rayon pool and unions the result in.
    pub fn add_ranges(&mut self, ranges: &[Ipv4Range]) {
        let expanded: BTreeSet<Ipv4Addr> = ranges
            .par_iter()
            .flat_map_iter(|range| range.iter())
            .collect();
        self.addrs.extend(expanded);
    }

    pub fn contains(&self, addr: &Ipv4Addr) -> bool {
        self.addrs.contains(addr)
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ipv4Addr> {
        self.addrs.iter()
    }
}

impl FromIterator<Ipv4Addr> for AddressSet {
    fn from_iter<T: IntoIterator<Item = Ipv4Addr>>(iter: T) -> Self {
        Self {
            addrs: iter.into_iter().collect(),
        }
    }
}

impl Extend<Ipv4Addr> for AddressSet {
    fn extend<T: IntoIterator<Item = Ipv4Addr>>(&mut self, iter: T) {
        self.addrs.extend(iter);
    }
}

impl<'a> IntoIterator for &'a AddressSet {
    type Item = &'a Ipv4Addr;
    type IntoIter = std::collections::btree_set::Iter<'a, Ipv4Addr>;

    fn into_iter(self) -> Self::IntoIter {
        self.addrs.iter()
    }
}
