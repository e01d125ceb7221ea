use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use colored::*;
use scopr_core::classify::{ClassifiedPair, Reason};
use scopr_core::discovery::{SourceReport, SourceStatus};
use scopr_core::pipeline::{OUT_OF_SCOPE, RunSummary};

use crate::terminal::colors;

/// Hostname to its addresses, sorted.
pub type HostAddrs<'a> = BTreeMap<&'a str, Vec<Ipv4Addr>>;

pub fn source_status(report: &SourceReport) -> ColoredString {
    let color = match report.status {
        SourceStatus::Completed(_) => colors::OK,
        SourceStatus::Skipped(_) | SourceStatus::TimedOut => colors::WARN,
        SourceStatus::Failed(_) => colors::FAIL,
    };
    report.status.to_string().color(color)
}

/// Splits pairs by the rule that matched them, then groups each split by host.
pub fn group_by_reason(pairs: &BTreeSet<ClassifiedPair>) -> BTreeMap<Reason, HostAddrs<'_>> {
    let mut grouped: BTreeMap<Reason, HostAddrs<'_>> = BTreeMap::new();
    for classified in pairs {
        grouped
            .entry(classified.reason)
            .or_default()
            .entry(classified.pair.hostname.as_str())
            .or_default()
            .push(classified.pair.addr);
    }
    grouped
}

pub fn reason_title(reason: Reason, hosts: usize) -> ColoredString {
    let label = match reason {
        Reason::HostnameMatch => "listed in scope by name",
        Reason::AddressMatch => "resolves into scope",
        Reason::NoMatch => "no match",
    };
    format!("{label} ({hosts})").color(colors::ACCENT)
}

pub fn host_rows<'a>(hosts: &HostAddrs<'a>) -> Vec<(&'a str, ColoredString)> {
    hosts
        .iter()
        .map(|(host, addrs)| {
            let addrs = addrs
                .iter()
                .map(Ipv4Addr::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            (*host, addrs.color(colors::IPV4_ADDR))
        })
        .collect()
}

/// Explains an empty in-scope list from the stage counts.
pub fn why_nothing_in_scope(summary: &RunSummary) -> String {
    if summary.candidates == 0 {
        "discovery produced no candidate hostnames".to_string()
    } else if summary.resolved == 0 {
        format!(
            "none of the {} candidate(s) resolved to an IPv4 address",
            summary.candidates
        )
    } else {
        format!(
            "all {} resolved pair(s) fell outside the scope, see {OUT_OF_SCOPE}",
            summary.resolved
        )
    }
}
