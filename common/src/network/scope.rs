//! # Scope Entry Model
//!
//! A scope file is free-form text. Three token shapes are recognized in it:
//! * A domain (e.g., `portal.example.com`).
//! * A single IPv4 address (e.g., `203.0.113.10`).
//! * A CIDR block (e.g., `198.51.100.0/24`).
//!
//! A line may hold any number of these, mixed with unrelated text.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnetwork::{IpNetworkError, Ipv4Network};

use crate::error::ParseError;
use crate::network::range::{self, Ipv4Range};
use crate::utils::patterns;

/// A single recognized token from the scope definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScopeEntry {
    /// A hostname or apex domain, kept exactly as written.
    Domain(String),
    /// A single IPv4 address.
    Ip(Ipv4Addr),
    /// A CIDR block. The address may carry host bits; they are masked off on expansion.
    Cidr { network: Ipv4Addr, prefix: u8 },
}

impl ScopeEntry {
    /// Converts a CIDR entry into the range it covers. Other entries yield `None`.
    pub fn to_range(&self) -> Option<Result<Ipv4Range, ParseError>> {
        match self {
            ScopeEntry::Cidr { network, prefix } => Some(range::cidr_range(*network, *prefix)),
            _ => None,
        }
    }
}

impl FromStr for ScopeEntry {
    type Err = ParseError;

    /// Parses one clean token.
    ///
    /// Supported formats:
    /// * **CIDR**: "Network/Prefix" (e.g., "10.0.0.0/30").
    /// * **IP**: a dotted quad (e.g., "10.0.0.1").
    /// * **Domain**: labels separated by dots with an alphabetic TLD of two or more characters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(entry) = parse_cidr(s)? {
            return Ok(entry);
        }

        if let Ok(addr) = s.parse::<Ipv4Addr>() {
            return Ok(ScopeEntry::Ip(addr));
        }

        if patterns::is_hostname(s) {
            return Ok(ScopeEntry::Domain(s.to_string()));
        }

        Err(ParseError::Unrecognized(s.to_string()))
    }
}

impl fmt::Display for ScopeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeEntry::Domain(domain) => write!(f, "{domain}"),
            ScopeEntry::Ip(addr) => write!(f, "{addr}"),
            ScopeEntry::Cidr { network, prefix } => write!(f, "{network}/{prefix}"),
        }
    }
}

/// Parses CIDR notation like "192.168.1.0/24".
fn parse_cidr(s: &str) -> Result<Option<ScopeEntry>, ParseError> {
    if !s.contains('/') {
        return Ok(None);
    }

    let net = s
        .parse::<Ipv4Network>()
        .map_err(|e| cidr_error(s, e))?;

    Ok(Some(ScopeEntry::Cidr {
        network: net.ip(),
        prefix: net.prefix(),
    }))
}

fn cidr_error(token: &str, err: IpNetworkError) -> ParseError {
    if let IpNetworkError::InvalidAddr(_) = err {
        return ParseError::InvalidAddress(token.to_string());
    }
    let prefix = token
        .rsplit_once('/')
        .and_then(|(_, prefix)| prefix.parse::<u32>().ok());
    match prefix {
        Some(prefix) if prefix > 32 => ParseError::PrefixTooLong {
            token: token.to_string(),
            prefix,
        },
        _ => ParseError::InvalidPrefix(token.to_string()),
    }
}

/// Pulls every recognizable entry out of free-form text.
///
/// The three extractions run independently over the whole text. A CIDR token
/// also contributes its embedded address to the bare-IP extraction; the
/// overlap is harmless because everything ends up in a set. Malformed CIDR
/// tokens come back as `Err` so the caller decides how loud to be.
pub fn extract_entries(text: &str) -> Vec<Result<ScopeEntry, ParseError>> {
    let domains = patterns::hostnames(text).map(|domain| Ok(ScopeEntry::Domain(domain.to_string())));
    let addrs = patterns::ipv4_addrs(text).map(|addr| Ok(ScopeEntry::Ip(addr)));
    let cidrs = patterns::cidr_tokens(text).map(|token| token.parse::<ScopeEntry>());

    domains.chain(addrs).chain(cidrs).collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
