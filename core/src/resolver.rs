//! Forward resolution of the candidate frontier.
//!
//! The lookup itself is delegated to an external tool through
//! [`ForwardLookup`]; this module owns what happens to its output. Tool
//! failure is never fatal here: the caller gets an empty outcome and the
//! classifier simply has nothing to sort.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use thiserror::Error;

use scopr_common::{debug, success, utils::files, warn};

use crate::tools::{Tool, ToolError};

pub mod parse;

pub use parse::{ParseOutcome, Tier};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("failed to stage resolver input: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that turns hostnames into resolver text output.
#[async_trait]
pub trait ForwardLookup: Send + Sync {
    fn name(&self) -> &str;

    /// Startup check; an error here is fatal to the run.
    fn check(&self) -> Result<(), ToolError> {
        Ok(())
    }

    /// Looks up A and CNAME records for every host and returns the raw output.
    async fn lookup(&self, hosts: &BTreeSet<String>) -> Result<String, ResolveError>;
}

/// dnsx, asked for A and CNAME answers with responses shown.
pub struct DnsxLookup {
    tool: Tool,
}

impl DnsxLookup {
    pub fn new(program: &str) -> Self {
        Self {
            tool: Tool::new(program),
        }
    }
}

#[async_trait]
impl ForwardLookup for DnsxLookup {
    fn name(&self) -> &str {
        self.tool.program()
    }

    fn check(&self) -> Result<(), ToolError> {
        self.tool.locate().map(|_| ())
    }

    async fn lookup(&self, hosts: &BTreeSet<String>) -> Result<String, ResolveError> {
        let list = NamedTempFile::new()?;
        files::write_lines(list.path(), hosts)?;

        let args: [&OsStr; 6] = [
            OsStr::new("-l"),
            list.path().as_os_str(),
            OsStr::new("-a"),
            OsStr::new("-cname"),
            OsStr::new("-resp"),
            OsStr::new("-silent"),
        ];
        Ok(self.tool.run(args).await?)
    }
}

/// Resolves `hosts` and parses the answers with the tiered fallback chain.
pub async fn resolve(
    lookup: &dyn ForwardLookup,
    hosts: &BTreeSet<String>,
    limit: Duration,
) -> ParseOutcome {
    if hosts.is_empty() {
        warn!("No candidate hostnames to resolve");
        return ParseOutcome::default();
    }

    let output = match tokio::time::timeout(limit, lookup.lookup(hosts)).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            warn!("{} failed: {e}", lookup.name());
            return ParseOutcome::default();
        }
        Err(_) => {
            warn!("{} timed out after {}s", lookup.name(), limit.as_secs());
            return ParseOutcome::default();
        }
    };

    let outcome = parse::parse_resolver_output(&output);
    match outcome.tier {
        Some(tier) => {
            debug!("Resolver output parsed by the {tier} tier");
            success!("Resolved {} hostname/address pair(s)", outcome.pairs.len());
        }
        None => warn!("No hostname resolved to an IPv4 address"),
    }
    outcome
}
