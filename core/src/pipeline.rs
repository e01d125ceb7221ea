//! End-to-end run: scope → apex → discovery → resolution → classification.
//!
//! Each stage persists its output under the run's output directory before the
//! next stage starts. Files are replaced atomically, so an interrupted run
//! leaves every finalized file intact, and re-running with the same inputs
//! rewrites identical content.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{Instrument, info_span};

use scopr_common::{
    config::Config,
    info, success,
    utils::files,
    warn,
};

use crate::apex::{AcceptAll, ApexExtractor, ReviewCheckpoint, ReviewError};
use crate::classify::{Classification, ScopeClassifier};
use crate::discovery::{self, DiscoveryInput, DiscoverySource, SourceReport};
use crate::resolver::{self, DnsxLookup, ForwardLookup, Tier};
use crate::scope::{self, ScopeError};
use crate::tools::ToolError;

pub const EXPANDED_IPS: &str = "expanded-ips.txt";
pub const SCOPE_DOMAINS: &str = "scope-domains.txt";
pub const APEX_DOMAINS: &str = "apex-domains.txt";
pub const SOURCES_DIR: &str = "sources";
pub const CANDIDATES: &str = "candidate-subdomains.txt";
pub const RESOLVED: &str = "resolved-pairs.txt";
pub const IN_SCOPE: &str = "in-scope.txt";
pub const OUT_OF_SCOPE: &str = "out-of-scope.txt";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error("{what} {} does not exist", path.display())]
    MissingInput { what: &'static str, path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("required tool is unavailable: {0}")]
    MissingTool(#[from] ToolError),
    #[error("failed to write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Review(#[from] ReviewError),
}

/// The run's output directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn write<I, T>(&self, name: &str, items: I) -> Result<PathBuf, PipelineError>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let path = self.path(name);
        files::write_lines(&path, items).map_err(|source| PipelineError::Persist {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Counts and outcomes of one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub scope_domains: usize,
    pub addresses: usize,
    pub skipped_ranges: usize,
    pub apexes: BTreeSet<String>,
    pub sources: Vec<SourceReport>,
    pub candidates: usize,
    pub resolved: usize,
    pub resolver_tier: Option<Tier>,
    pub classification: Classification,
}

pub struct Pipeline<'a> {
    cfg: &'a Config,
    sources: Vec<Arc<dyn DiscoverySource>>,
    lookup: Box<dyn ForwardLookup>,
    review: Box<dyn ReviewCheckpoint>,
}

impl<'a> Pipeline<'a> {
    /// A pipeline with the sources and resolver named in `cfg` and no review pause.
    pub fn new(cfg: &'a Config) -> Self {
        Self {
            cfg,
            sources: discovery::build_sources(cfg),
            lookup: Box::new(DnsxLookup::new(&cfg.tools.dnsx)),
            review: Box::new(AcceptAll),
        }
    }

    pub fn with_sources(mut self, sources: Vec<Arc<dyn DiscoverySource>>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_lookup(mut self, lookup: Box<dyn ForwardLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_review(mut self, review: Box<dyn ReviewCheckpoint>) -> Self {
        self.review = review;
        self
    }

    /// Fatal checks done before any stage runs: every named input file must
    /// exist and the resolver tool must be available.
    pub fn preflight(&self, scope_file: &Path) -> Result<(), PipelineError> {
        if !scope_file.is_file() {
            return Err(ScopeError::MissingInput(scope_file.to_path_buf()).into());
        }

        let optional_inputs = [
            ("wordlist", &self.cfg.wordlist),
            ("resolver list", &self.cfg.resolvers),
            ("custom subdomain list", &self.cfg.custom_subdomains),
        ];
        for (what, path) in optional_inputs {
            if let Some(path) = path
                && !path.is_file()
            {
                return Err(PipelineError::MissingInput {
                    what,
                    path: path.clone(),
                });
            }
        }

        self.lookup.check()?;
        Ok(())
    }

    pub async fn run(&self, scope_file: &Path) -> Result<RunSummary, PipelineError> {
        self.preflight(scope_file)?;
        let ws = Workspace::new(&self.cfg.output_dir);

        let scope = info_span!("scope").in_scope(|| scope::expand_file(scope_file))?;
        ws.write(EXPANDED_IPS, &scope.addresses)?;
        ws.write(SCOPE_DOMAINS, &scope.domains)?;
        success!(
            "Scope expanded to {} domain(s) and {} address(es)",
            scope.domains.len(),
            scope.addresses.len()
        );
        if !scope.skipped.is_empty() {
            warn!("{} malformed range(s) were skipped", scope.skipped.len());
        }

        let custom: BTreeSet<String> = match &self.cfg.custom_subdomains {
            Some(path) => files::read_hostnames(path).map_err(|source| PipelineError::Read {
                path: path.clone(),
                source,
            })?,
            None => BTreeSet::new(),
        };

        let apexes = ApexExtractor::new()
            .with_custom(custom.iter().cloned())
            .extract(&scope.domains);
        let apex_file = ws.write(APEX_DOMAINS, &apexes)?;
        let apexes = self.review.review("apex domains", &apex_file, apexes)?;
        ws.write(APEX_DOMAINS, &apexes)?;
        success!("{} apex domain(s) to explore", apexes.len());

        let input = Arc::new(DiscoveryInput {
            apexes: apexes.clone(),
            addresses: scope.addresses.clone(),
            wordlist: self.cfg.wordlist.clone(),
            resolvers: self.cfg.resolvers.clone(),
        });
        let sources_dir = ws.path(SOURCES_DIR);
        let (mut frontier, reports) = discovery::run_sources(
            &self.sources,
            input,
            self.cfg.source_timeout,
            Some(sources_dir.as_path()),
        )
        .instrument(info_span!("discovery"))
        .await;

        frontier.merge(&scope.domains);
        frontier.merge(&apexes);
        frontier.merge(&custom);
        ws.write(CANDIDATES, frontier.hosts())?;
        success!("{} candidate hostname(s) collected", frontier.len());

        let outcome = resolver::resolve(
            self.lookup.as_ref(),
            frontier.hosts(),
            self.cfg.resolve_timeout,
        )
        .instrument(info_span!("resolve"))
        .await;
        ws.write(RESOLVED, &outcome.pairs)?;

        let classification = ScopeClassifier::new(&scope.domains, &scope.addresses)
            .classify(outcome.pairs.iter().cloned());
        ws.write(IN_SCOPE, &classification.in_scope)?;
        ws.write(OUT_OF_SCOPE, &classification.out_of_scope)?;
        info!(
            "{} pair(s) in scope, {} out of scope",
            classification.in_scope.len(),
            classification.out_of_scope.len()
        );

        Ok(RunSummary {
            output_dir: ws.root().to_path_buf(),
            scope_domains: scope.domains.len(),
            addresses: scope.addresses.len(),
            skipped_ranges: scope.skipped.len(),
            apexes,
            sources: reports,
            candidates: frontier.len(),
            resolved: outcome.pairs.len(),
            resolver_tier: outcome.tier,
            classification,
        })
    }
}
