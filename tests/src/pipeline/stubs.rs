use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use scopr_core::apex::{ReviewCheckpoint, ReviewError};
use scopr_core::discovery::{DiscoveryInput, DiscoverySource, SourceError};
use scopr_core::resolver::{ForwardLookup, ResolveError};
use scopr_core::tools::ToolError;

/// Returns the same hostnames on every call.
pub struct StaticSource {
    pub name: &'static str,
    pub hosts: Vec<&'static str>,
}

impl StaticSource {
    pub fn shared(name: &'static str, hosts: Vec<&'static str>) -> Arc<dyn DiscoverySource> {
        Arc::new(Self { name, hosts })
    }
}

#[async_trait]
impl DiscoverySource for StaticSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn discover(&self, _input: &DiscoveryInput) -> Result<BTreeSet<String>, SourceError> {
        Ok(self.hosts.iter().map(|host| host.to_string()).collect())
    }
}

pub struct FailingSource;

#[async_trait]
impl DiscoverySource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    async fn discover(&self, _input: &DiscoveryInput) -> Result<BTreeSet<String>, SourceError> {
        Err(SourceError::Response("upstream returned garbage".into()))
    }
}

/// Records the apexes it was handed and returns nothing.
#[derive(Default)]
pub struct ApexRecorder {
    pub seen: std::sync::Mutex<BTreeSet<String>>,
}

#[async_trait]
impl DiscoverySource for ApexRecorder {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn discover(&self, input: &DiscoveryInput) -> Result<BTreeSet<String>, SourceError> {
        self.seen
            .lock()
            .unwrap()
            .extend(input.apexes.iter().cloned());
        Ok(BTreeSet::new())
    }
}

/// Replays fixed resolver output and counts how often it was asked.
pub struct CannedLookup {
    pub output: String,
    pub calls: Arc<AtomicUsize>,
}

impl CannedLookup {
    pub fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ForwardLookup for CannedLookup {
    fn name(&self) -> &str {
        "canned"
    }

    async fn lookup(&self, _hosts: &BTreeSet<String>) -> Result<String, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

pub struct MissingLookup;

#[async_trait]
impl ForwardLookup for MissingLookup {
    fn name(&self) -> &str {
        "missing"
    }

    fn check(&self) -> Result<(), ToolError> {
        Err(ToolError::NotFound("dnsx".into()))
    }

    async fn lookup(&self, _hosts: &BTreeSet<String>) -> Result<String, ResolveError> {
        Ok(String::new())
    }
}

pub struct AbortReview;

impl ReviewCheckpoint for AbortReview {
    fn review(
        &self,
        _stage: &str,
        _file: &Path,
        _items: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ReviewError> {
        Err(ReviewError::Aborted)
    }
}

/// Acts like a user who deleted every line but `keep` from the file.
pub struct KeepOnly(pub &'static str);

impl ReviewCheckpoint for KeepOnly {
    fn review(
        &self,
        _stage: &str,
        _file: &Path,
        items: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ReviewError> {
        Ok(items.into_iter().filter(|item| item == self.0).collect())
    }
}
