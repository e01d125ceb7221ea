//! Token extraction over free-form text.
//!
//! The same hostname pattern is used for scope files, custom lists and every
//! discovery tool's output, so a hostname means the same thing everywhere:
//! dot-separated labels ending in an alphabetic TLD of at least two characters.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::sync::LazyLock;

use regex::Regex;

static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[A-Za-z0-9_](?:[A-Za-z0-9_-]*[A-Za-z0-9_])?\.)+[A-Za-z]{2,}\b")
        .expect("hostname pattern compiles")
});

static HOSTNAME_EXACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9_](?:[A-Za-z0-9_-]*[A-Za-z0-9_])?\.)+[A-Za-z]{2,}$")
        .expect("exact hostname pattern compiles")
});

static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").expect("ipv4 pattern compiles")
});

static CIDR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}/[0-9]{1,3}\b").expect("cidr pattern compiles")
});

/// Every hostname-shaped token in `text`, in order of appearance.
///
/// A leading wildcard label never matches, so `*.example.com` yields `example.com`.
pub fn hostnames(text: &str) -> impl Iterator<Item = &str> {
    HOSTNAME.find_iter(text).map(|m| m.as_str())
}

/// Every dotted quad in `text` that is a valid IPv4 address.
///
/// Quads with an octet above 255 are dropped.
pub fn ipv4_addrs(text: &str) -> impl Iterator<Item = Ipv4Addr> + '_ {
    IPV4.find_iter(text)
        .filter_map(|m| m.as_str().parse::<Ipv4Addr>().ok())
}

/// Every `address/prefix` token in `text`, unvalidated.
pub fn cidr_tokens(text: &str) -> impl Iterator<Item = &str> {
    CIDR.find_iter(text).map(|m| m.as_str())
}

pub fn is_hostname(s: &str) -> bool {
    HOSTNAME_EXACT.is_match(s)
}

pub fn first_hostname(text: &str) -> Option<&str> {
    HOSTNAME.find(text).map(|m| m.as_str())
}

pub fn first_ipv4(text: &str) -> Option<Ipv4Addr> {
    ipv4_addrs(text).next()
}

/// Collects the distinct hostnames found anywhere in `text`.
pub fn extract_hostnames(text: &str) -> BTreeSet<String> {
    hostnames(text).map(str::to_string).collect()
}

/// Cleans a single hostname token: trims whitespace, drops a leading `*.` and
/// a trailing root dot. Returns `None` if what remains is not hostname-shaped.
///
/// Case is preserved.
pub fn normalize_hostname(raw: &str) -> Option<String> {
    let mut host = raw.trim();
    while let Some(rest) = host.strip_prefix("*.") {
        host = rest;
    }
    let host = host.strip_suffix('.').unwrap_or(host);

    is_hostname(host).then(|| host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostnames_in_free_text() {
        let text = "scope: www.example.com, *.dev.example.org and 10.0.0.1 (see notes)";
        let found: Vec<&str> = hostnames(text).collect();
        assert_eq!(found, vec!["www.example.com", "dev.example.org"]);
    }

    #[test]
    fn hostname_requires_alpha_tld() {
        assert!(is_hostname("example.com"));
        assert!(is_hostname("_dmarc.example.io"));
        assert!(is_hostname("xn--bcher-kva.example"));
        assert!(!is_hostname("example"));
        assert!(!is_hostname("10.0.0.1"));
        assert!(!is_hostname("example.c"));
        assert!(!is_hostname("-bad.example.com"));
    }

    #[test]
    fn ipv4_extraction_skips_invalid_octets() {
        let text = "10.0.0.1 300.1.1.1 192.168.1.0/24";
        let found: Vec<Ipv4Addr> = ipv4_addrs(text).collect();
        assert_eq!(
            found,
            vec![Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(192, 168, 1, 0)]
        );
    }

    #[test]
    fn cidr_tokens_take_the_whole_notation() {
        let text = "ranges: 10.0.0.0/30, 172.16.0.0/12; host 10.9.9.9";
        let found: Vec<&str> = cidr_tokens(text).collect();
        assert_eq!(found, vec!["10.0.0.0/30", "172.16.0.0/12"]);
    }

    #[test]
    fn normalize_strips_wildcard_and_root_dot() {
        assert_eq!(normalize_hostname(" *.api.example.com. "), Some("api.example.com".into()));
        assert_eq!(normalize_hostname("Mail.Example.com"), Some("Mail.Example.com".into()));
        assert_eq!(normalize_hostname("*"), None);
        assert_eq!(normalize_hostname("10.0.0.1"), None);
    }

    #[test]
    fn first_tokens_on_a_line() {
        let line = "1.2.3.4 [PTR] [host.example.com]";
        assert_eq!(first_hostname(line), Some("host.example.com"));
        assert_eq!(first_ipv4(line), Some(Ipv4Addr::new(1, 2, 3, 4)));
    }
}
