//! Scope expansion.
//!
//! Turns the free-form scope definition into the two ground truths used by
//! classification: the set of hostnames named in it and the set of every
//! address it covers.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use scopr_common::{
    debug,
    error::ParseError,
    network::{
        address::AddressSet,
        range::Ipv4Range,
        scope::{self, ScopeEntry},
    },
    warn,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("scope file {} does not exist", .0.display())]
    MissingInput(PathBuf),
    #[error("failed to read scope file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of expanding a scope definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedScope {
    /// Hostnames exactly as they appear in the scope file.
    pub domains: BTreeSet<String>,
    /// Bare IPs plus every address of every CIDR range.
    pub addresses: AddressSet,
    /// CIDR ranges that were expanded into `addresses`.
    pub ranges: Vec<Ipv4Range>,
    /// Malformed CIDR tokens that were skipped.
    pub skipped: Vec<ParseError>,
}

/// Reads and expands a scope file. A missing file is fatal.
pub fn expand_file(path: &Path) -> Result<ExpandedScope, ScopeError> {
    if !path.is_file() {
        return Err(ScopeError::MissingInput(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| ScopeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(expand_text(&text))
}

/// Expands scope text.
///
/// A malformed CIDR token is logged and skipped; the remaining tokens are
/// still processed.
pub fn expand_text(text: &str) -> ExpandedScope {
    let mut expanded = ExpandedScope::default();
    let mut ranges: BTreeSet<Ipv4Range> = BTreeSet::new();

    for entry in scope::extract_entries(text) {
        match entry {
            Ok(ScopeEntry::Domain(domain)) => {
                expanded.domains.insert(domain);
            }
            Ok(ScopeEntry::Ip(addr)) => {
                expanded.addresses.add_single(addr);
            }
            Ok(cidr @ ScopeEntry::Cidr { .. }) => match cidr.to_range() {
                Some(Ok(range)) => {
                    ranges.insert(range);
                }
                Some(Err(e)) => {
                    warn!("Skipping CIDR range {cidr}: {e}");
                    expanded.skipped.push(e);
                }
                None => {}
            },
            Err(e) => {
                warn!("Skipping CIDR range: {e}");
                expanded.skipped.push(e);
            }
        }
    }

    expanded.ranges = ranges.into_iter().collect();
    expanded.addresses.add_ranges(&expanded.ranges);

    debug!(
        "Scope holds {} domain(s), {} range(s) and {} address(es)",
        expanded.domains.len(),
        expanded.ranges.len(),
        expanded.addresses.len()
    );

    expanded
}
