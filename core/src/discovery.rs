//! Subdomain discovery.
//!
//! Every discovery technique is a [`DiscoverySource`]. Sources run as
//! independent tasks with no shared state; each returns its own hostname set.
//! Only after every task has finished are the results merged into the
//! [`Frontier`], at a single point.
//!
//! A source that fails, times out or cannot run is logged and reported, never
//! propagated: the pipeline continues with whatever the other sources found.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;

use scopr_common::{
    config::{Config, SourceKind},
    error,
    network::address::AddressSet,
    success,
    utils::{files, patterns},
    warn,
};

use crate::tools::ToolError;

mod brute;
mod crtsh;
mod passive;
mod reverse;

pub use brute::BruteForceSource;
pub use crtsh::CrtShSource;
pub use passive::PassiveSource;
pub use reverse::ReverseLookupSource;

#[derive(Debug, Error)]
pub enum SourceError {
    /// The source has nothing to work with or its tool is absent.
    #[error("{0}")]
    Skipped(String),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Response(String),
    #[error("all {0} queries failed")]
    AllQueriesFailed(usize),
    #[error("failed to stage tool input: {0}")]
    Io(#[from] std::io::Error),
}

/// What every source may draw on.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryInput {
    /// The reviewed apex domains.
    pub apexes: BTreeSet<String>,
    /// Every address in scope.
    pub addresses: AddressSet,
    pub wordlist: Option<PathBuf>,
    pub resolvers: Option<PathBuf>,
}

#[async_trait]
pub trait DiscoverySource: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the hostnames this source found. An empty set is a valid answer.
    async fn discover(&self, input: &DiscoveryInput) -> Result<BTreeSet<String>, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Completed(usize),
    Skipped(String),
    Failed(String),
    TimedOut,
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceStatus::Completed(count) => write!(f, "{count} hostname(s)"),
            SourceStatus::Skipped(reason) => write!(f, "skipped ({reason})"),
            SourceStatus::Failed(reason) => write!(f, "failed ({reason})"),
            SourceStatus::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Outcome of one source, kept for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: String,
    pub status: SourceStatus,
}

/// The deduplicated set of candidate hostnames awaiting resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontier {
    hosts: BTreeSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes and inserts one candidate. Returns `false` if it was not
    /// hostname-shaped or was already present.
    pub fn insert(&mut self, candidate: &str) -> bool {
        match patterns::normalize_hostname(candidate) {
            Some(host) => self.hosts.insert(host),
            None => false,
        }
    }

    pub fn merge<I, S>(&mut self, candidates: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for candidate in candidates {
            self.insert(candidate.as_ref());
        }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn hosts(&self) -> &BTreeSet<String> {
        &self.hosts
    }
}

/// Builds the sources enabled in `cfg`.
pub fn build_sources(cfg: &Config) -> Vec<Arc<dyn DiscoverySource>> {
    let mut sources: Vec<Arc<dyn DiscoverySource>> = Vec::new();

    for kind in &cfg.sources {
        match kind {
            SourceKind::CrtSh => match CrtShSource::new(cfg.source_timeout) {
                Ok(source) => sources.push(Arc::new(source)),
                Err(e) => error!("Could not set up the crt.sh client: {e}"),
            },
            SourceKind::Passive => {
                sources.push(Arc::new(PassiveSource::new(&cfg.tools.subfinder)));
            }
            SourceKind::Brute => {
                sources.push(Arc::new(BruteForceSource::new(&cfg.tools.puredns)));
            }
            SourceKind::Reverse => {
                sources.push(Arc::new(ReverseLookupSource::new(&cfg.tools.dnsx)));
            }
        }
    }

    sources
}

type SourceOutcome = Result<Result<BTreeSet<String>, SourceError>, tokio::time::error::Elapsed>;

/// Runs every source concurrently and waits for all of them.
///
/// Each source is bounded by `limit`. When `sink` is given, each source writes
/// its own hostnames to `<sink>/<name>.txt` before the join, and a source
/// that fails or times out removes any file left there earlier. The returned
/// frontier is the union of every successful source.
pub async fn run_sources(
    sources: &[Arc<dyn DiscoverySource>],
    input: Arc<DiscoveryInput>,
    limit: Duration,
    sink: Option<&Path>,
) -> (Frontier, Vec<SourceReport>) {
    let handles: Vec<(String, JoinHandle<SourceOutcome>)> = sources
        .iter()
        .map(|source| {
            let source = Arc::clone(source);
            let input = Arc::clone(&input);
            let sink_file = sink.map(|dir| dir.join(format!("{}.txt", source.name())));
            let name = source.name().to_string();

            let handle = tokio::spawn(async move {
                let outcome = tokio::time::timeout(limit, source.discover(&input)).await;
                if let Some(path) = &sink_file {
                    // A source that did not complete must not leave an older run's list behind.
                    let updated = match &outcome {
                        Ok(Ok(hosts)) => files::write_lines_async(path, hosts).await,
                        _ => files::remove_if_present(path).await,
                    };
                    if let Err(e) = updated {
                        warn!("Could not update {}: {e}", path.display());
                    }
                }
                outcome
            });
            (name, handle)
        })
        .collect();

    let mut results: Vec<(String, BTreeSet<String>)> = Vec::new();
    let mut reports: Vec<SourceReport> = Vec::with_capacity(handles.len());

    for (name, handle) in handles {
        let status = match handle.await {
            Ok(Ok(Ok(hosts))) => {
                let status = SourceStatus::Completed(hosts.len());
                results.push((name.clone(), hosts));
                status
            }
            Ok(Ok(Err(SourceError::Skipped(reason)))) => SourceStatus::Skipped(reason),
            Ok(Ok(Err(e))) => SourceStatus::Failed(e.to_string()),
            Ok(Err(_)) => SourceStatus::TimedOut,
            Err(e) => SourceStatus::Failed(format!("task panicked: {e}")),
        };
        log_status(&name, &status);
        reports.push(SourceReport {
            source: name,
            status,
        });
    }

    let mut frontier = Frontier::new();
    for (_, hosts) in results {
        frontier.merge(hosts);
    }

    (frontier, reports)
}

fn log_status(name: &str, status: &SourceStatus) {
    match status {
        SourceStatus::Completed(_) => success!("{name}: {status}"),
        _ => warn!("{name}: {status}"),
    }
}
