//! Resolver output parsing.
//!
//! Resolver tools disagree on layout: `host [A] [1.2.3.4]`, `host 1.2.3.4`,
//! `host. A 1.2.3.4` and worse. Rather than detect the format up front, the
//! output goes through an ordered chain of strategies. The first one that
//! yields at least one pair wins outright; results are never merged across
//! strategies. Every strategy is a pure function of the text.

use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;

use scopr_common::{network::host::ResolvedPair, utils::patterns};

pub type ParseStrategy = fn(&str) -> BTreeSet<ResolvedPair>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Explicit `[A]` record markers.
    Marked,
    /// Hostname in the first column, address in the second.
    Positional,
    /// First hostname and first address anywhere on the line.
    Permissive,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Marked => f.write_str("marked"),
            Tier::Positional => f.write_str("positional"),
            Tier::Permissive => f.write_str("permissive"),
        }
    }
}

/// Strategies in the order they are tried.
pub const STRATEGIES: &[(Tier, ParseStrategy)] = &[
    (Tier::Marked, parse_marked),
    (Tier::Positional, parse_positional),
    (Tier::Permissive, parse_permissive),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// The strategy that produced `pairs`, `None` if none did.
    pub tier: Option<Tier>,
    pub pairs: BTreeSet<ResolvedPair>,
}

/// Runs the strategy chain over `output`.
pub fn parse_resolver_output(output: &str) -> ParseOutcome {
    STRATEGIES
        .iter()
        .find_map(|(tier, strategy)| {
            let pairs = strategy(output);
            (!pairs.is_empty()).then_some(ParseOutcome {
                tier: Some(*tier),
                pairs,
            })
        })
        .unwrap_or_default()
}

/// `host [A] [1.2.3.4]`, also `host [A] [1.2.3.4,5.6.7.8]` and
/// `host [A] 1.2.3.4 5.6.7.8`. Lines with other record types are ignored.
pub fn parse_marked(output: &str) -> BTreeSet<ResolvedPair> {
    let mut pairs = BTreeSet::new();

    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some(marker) = fields.iter().position(|f| f.eq_ignore_ascii_case("[A]")) else {
            continue;
        };
        let Some(host) = fields.first().and_then(|f| patterns::normalize_hostname(f)) else {
            continue;
        };

        let addrs = fields[marker + 1..]
            .iter()
            .flat_map(|field| strip_brackets(field).split(','))
            .filter(|value| !value.is_empty())
            .map_while(|value| value.trim().parse::<Ipv4Addr>().ok());

        for addr in addrs {
            pairs.insert(ResolvedPair::new(host.clone(), addr));
        }
    }

    pairs
}

/// `host 1.2.3.4` or `host [1.2.3.4]`; further columns are ignored.
pub fn parse_positional(output: &str) -> BTreeSet<ResolvedPair> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let host = patterns::normalize_hostname(fields.next()?)?;
            let addr = strip_brackets(fields.next()?).parse::<Ipv4Addr>().ok()?;
            Some(ResolvedPair::new(host, addr))
        })
        .collect()
}

/// Any line carrying both a hostname-shaped and an IPv4-shaped token.
pub fn parse_permissive(output: &str) -> BTreeSet<ResolvedPair> {
    output
        .lines()
        .filter_map(|line| {
            let host = patterns::first_hostname(line)?;
            let addr = patterns::first_ipv4(line)?;
            Some(ResolvedPair::new(host, addr))
        })
        .collect()
}

fn strip_brackets(field: &str) -> &str {
    field.trim_start_matches('[').trim_end_matches(']')
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
