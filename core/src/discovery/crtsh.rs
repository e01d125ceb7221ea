//! Certificate transparency search through crt.sh.
//!
//! One request per apex domain. Batching every domain into one query runs into
//! response and query-string limits, and a single failing domain would then
//! cost every result. Each query has its own timeout and the source stops
//! collecting shortly before its overall limit, so a hung domain is counted as
//! one failure and the names already found are kept.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use tokio::time::Instant;

use scopr_common::{debug, utils::patterns, warn};

use super::{DiscoveryInput, DiscoverySource, SourceError};

const CRTSH_URL: &str = "https://crt.sh/";
/// crt.sh throttles aggressive clients; keep a few queries in flight.
const MAX_IN_FLIGHT: usize = 4;
/// One query may use this fraction of the source timeout.
const QUERY_SHARE: u32 = 4;

#[derive(Debug, Deserialize)]
struct CertificateEntry {
    name_value: String,
}

pub struct CrtShSource {
    client: Client,
    base_url: String,
    query_timeout: Duration,
    budget: Duration,
}

impl CrtShSource {
    /// `source_timeout` is the limit the whole source runs under.
    pub fn new(source_timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!("scopr/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: CRTSH_URL.to_string(),
            query_timeout: source_timeout / QUERY_SHARE,
            budget: source_timeout * 9 / 10,
        })
    }

    /// Points the source at another crt.sh-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    /// Time spent collecting answers before returning what arrived.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    async fn query_domain(&self, domain: &str) -> Result<BTreeSet<String>, SourceError> {
        let body = self
            .client
            .get(&self.base_url)
            .query(&[("q", format!("%.{domain}")), ("output", "json".to_string())])
            .timeout(self.query_timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_certificates(&body)
    }
}

#[async_trait]
impl DiscoverySource for CrtShSource {
    fn name(&self) -> &str {
        "crtsh"
    }

    async fn discover(&self, input: &DiscoveryInput) -> Result<BTreeSet<String>, SourceError> {
        if input.apexes.is_empty() {
            return Err(SourceError::Skipped("no apex domains to search".into()));
        }

        let total = input.apexes.len();
        let deadline = Instant::now() + self.budget;
        let mut results = stream::iter(input.apexes.iter().cloned())
            .map(|domain| async move {
                let result = self.query_domain(&domain).await;
                (domain, result)
            })
            .buffer_unordered(MAX_IN_FLIGHT)
            .boxed();

        let mut found: BTreeSet<String> = BTreeSet::new();
        let mut answered: usize = 0;
        let mut failures: usize = 0;

        loop {
            let (domain, result) = match tokio::time::timeout_at(deadline, results.next()).await {
                Ok(Some(next)) => next,
                Ok(None) => break,
                Err(_) => {
                    let pending = total - answered;
                    warn!("crt.sh ran out of time with {pending} domain(s) unanswered");
                    failures += pending;
                    break;
                }
            };
            answered += 1;

            match result {
                Ok(names) => {
                    debug!("crt.sh returned {} name(s) for {domain}", names.len());
                    found.extend(names);
                }
                Err(e) => {
                    warn!("crt.sh query for {domain} failed: {e}");
                    failures += 1;
                }
            }
        }

        if failures == total {
            return Err(SourceError::AllQueriesFailed(failures));
        }

        Ok(found)
    }
}
/// Extracts hostnames from a crt.sh JSON response.
///
/// `name_value` may hold several newline-separated names and wildcard
/// entries; wildcards are stripped. An empty body means no certificates.
pub fn parse_certificates(body: &str) -> Result<BTreeSet<String>, SourceError> {
    if body.trim().is_empty() {
        return Ok(BTreeSet::new());
    }

    let entries: Vec<CertificateEntry> =
        serde_json::from_str(body).map_err(|e| SourceError::Response(e.to_string()))?;

    Ok(entries
        .iter()
        .flat_map(|entry| patterns::hostnames(&entry.name_value))
        .map(str::to_string)
        .collect())
}
