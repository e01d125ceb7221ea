//! Active brute force through puredns.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::Path;

use async_trait::async_trait;
use tempfile::NamedTempFile;

use scopr_common::utils::{files, patterns};

use super::{DiscoveryInput, DiscoverySource, SourceError};
use crate::tools::Tool;

pub struct BruteForceSource {
    tool: Tool,
}

impl BruteForceSource {
    pub fn new(program: &str) -> Self {
        Self {
            tool: Tool::new(program),
        }
    }
}

#[async_trait]
impl DiscoverySource for BruteForceSource {
    fn name(&self) -> &str {
        "brute"
    }

    async fn discover(&self, input: &DiscoveryInput) -> Result<BTreeSet<String>, SourceError> {
        let (wordlist, resolvers) = match (&input.wordlist, &input.resolvers) {
            (Some(wordlist), Some(resolvers)) => (wordlist, resolvers),
            _ => {
                return Err(SourceError::Skipped(
                    "brute force needs both a wordlist and a resolver list".into(),
                ));
            }
        };
        if input.apexes.is_empty() {
            return Err(SourceError::Skipped("no apex domains to brute force".into()));
        }
        self.tool
            .locate()
            .map_err(|e| SourceError::Skipped(e.to_string()))?;

        let domains = NamedTempFile::new()?;
        files::write_lines(domains.path(), &input.apexes)?;

        let stdout = self
            .tool
            .run(bruteforce_args(wordlist, domains.path(), resolvers))
            .await?;

        Ok(patterns::extract_hostnames(&stdout))
    }
}

fn bruteforce_args<'a>(wordlist: &'a Path, domains: &'a Path, resolvers: &'a Path) -> [&'a OsStr; 7] {
    [
        OsStr::new("bruteforce"),
        wordlist.as_os_str(),
        OsStr::new("-d"),
        domains.as_os_str(),
        OsStr::new("-r"),
        resolvers.as_os_str(),
        OsStr::new("-q"),
    ]
}
