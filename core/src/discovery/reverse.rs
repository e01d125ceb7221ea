//! Reverse lookup of in-scope addresses through dnsx.

use std::collections::BTreeSet;
use std::ffi::OsStr;

use async_trait::async_trait;
use tempfile::NamedTempFile;

use scopr_common::utils::{files, patterns};

use super::{DiscoveryInput, DiscoverySource, SourceError};
use crate::tools::Tool;

pub struct ReverseLookupSource {
    tool: Tool,
}

impl ReverseLookupSource {
    pub fn new(program: &str) -> Self {
        Self {
            tool: Tool::new(program),
        }
    }
}

#[async_trait]
impl DiscoverySource for ReverseLookupSource {
    fn name(&self) -> &str {
        "reverse"
    }

    async fn discover(&self, input: &DiscoveryInput) -> Result<BTreeSet<String>, SourceError> {
        if input.addresses.is_empty() {
            return Err(SourceError::Skipped("no addresses in scope".into()));
        }
        self.tool
            .locate()
            .map_err(|e| SourceError::Skipped(e.to_string()))?;

        let addresses = NamedTempFile::new()?;
        files::write_lines(addresses.path(), &input.addresses)?;

        let args: [&OsStr; 5] = [
            OsStr::new("-l"),
            addresses.path().as_os_str(),
            OsStr::new("-ptr"),
            OsStr::new("-resp"),
            OsStr::new("-silent"),
        ];
        let stdout = self.tool.run(args).await?;

        Ok(ptr_hostnames(&stdout))
    }
}

/// Hostnames from `address [PTR] [hostname]` lines.
///
/// Addresses never look like hostnames (their last label is numeric), so every
/// hostname-shaped token on a line is a PTR answer.
fn ptr_hostnames(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .flat_map(patterns::hostnames)
        .filter_map(patterns::normalize_hostname)
        .collect()
}
