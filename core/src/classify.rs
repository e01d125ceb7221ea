//! In-scope / out-of-scope classification.
//!
//! Every resolved pair gets exactly one verdict. Rules, in order:
//! 1. the hostname is literally one of the scope's hostnames → in scope;
//! 2. the address is in the expanded address set → in scope;
//! 3. otherwise → out of scope.
//!
//! The rule that fired is kept with the pair so a verdict can be audited.

use std::collections::BTreeSet;
use std::fmt;

use scopr_common::{
    debug,
    network::{address::AddressSet, host::ResolvedPair},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verdict {
    InScope,
    OutOfScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Reason {
    /// The hostname appears verbatim in the scope definition.
    HostnameMatch,
    /// The address is covered by the scope's IPs or ranges.
    AddressMatch,
    NoMatch,
}

impl Reason {
    pub fn verdict(&self) -> Verdict {
        match self {
            Reason::HostnameMatch | Reason::AddressMatch => Verdict::InScope,
            Reason::NoMatch => Verdict::OutOfScope,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::HostnameMatch => f.write_str("hostname in scope"),
            Reason::AddressMatch => f.write_str("address in scope"),
            Reason::NoMatch => f.write_str("no match"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassifiedPair {
    pub pair: ResolvedPair,
    pub reason: Reason,
}

impl ClassifiedPair {
    pub fn verdict(&self) -> Verdict {
        self.reason.verdict()
    }
}

impl fmt::Display for ClassifiedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.pair, f)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub in_scope: BTreeSet<ClassifiedPair>,
    pub out_of_scope: BTreeSet<ClassifiedPair>,
}

impl Classification {
    pub fn len(&self) -> usize {
        self.in_scope.len() + self.out_of_scope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct hostnames with at least one in-scope pair.
    pub fn in_scope_hosts(&self) -> BTreeSet<&str> {
        self.in_scope
            .iter()
            .map(|classified| classified.pair.hostname.as_str())
            .collect()
    }
}

pub struct ScopeClassifier<'a> {
    hostnames: &'a BTreeSet<String>,
    addresses: &'a AddressSet,
}

impl<'a> ScopeClassifier<'a> {
    pub fn new(hostnames: &'a BTreeSet<String>, addresses: &'a AddressSet) -> Self {
        Self {
            hostnames,
            addresses,
        }
    }

    /// Which rule applies to `pair`. Hostname comparison is exact and case-sensitive.
    pub fn decide(&self, pair: &ResolvedPair) -> Reason {
        if self.hostnames.contains(&pair.hostname) {
            Reason::HostnameMatch
        } else if self.addresses.contains(&pair.addr) {
            Reason::AddressMatch
        } else {
            Reason::NoMatch
        }
    }

    pub fn classify<I>(&self, pairs: I) -> Classification
    where
        I: IntoIterator<Item = ResolvedPair>,
    {
        let mut classification = Classification::default();

        for pair in pairs {
            let reason = self.decide(&pair);
            debug!("{pair}: {:?} ({reason})", reason.verdict());

            let classified = ClassifiedPair { pair, reason };
            match classified.verdict() {
                Verdict::InScope => classification.in_scope.insert(classified),
                Verdict::OutOfScope => classification.out_of_scope.insert(classified),
            };
        }

        classification
    }
}
