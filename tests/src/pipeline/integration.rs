#![cfg(test)]
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use scopr_common::config::Config;
use scopr_core::classify::{Reason, Verdict};
use scopr_core::discovery::{DiscoverySource, SourceStatus};
use scopr_core::pipeline::{
    Pipeline, PipelineError, APEX_DOMAINS, CANDIDATES, EXPANDED_IPS, IN_SCOPE, OUT_OF_SCOPE,
    RESOLVED, SCOPE_DOMAINS, SOURCES_DIR,
};
use scopr_core::resolver::Tier;
use scopr_core::scope::ScopeError;
use tempfile::TempDir;

use super::stubs::{
    AbortReview, ApexRecorder, CannedLookup, FailingSource, KeepOnly, MissingLookup, StaticSource,
};

const SCOPE: &str = "example.com\n10.0.0.0/30\n";
const RESOLVER_OUTPUT: &str = "www.example.com [A] [10.0.0.5]\nother.example.com [A] [10.0.0.1]\n";

fn setup(scope: &str) -> (TempDir, PathBuf, Config) {
    let dir = TempDir::new().unwrap();
    let scope_file = dir.path().join("scope.txt");
    fs::write(&scope_file, scope).unwrap();
    let cfg = Config {
        output_dir: dir.path().join("out"),
        ..Config::default()
    };
    (dir, scope_file, cfg)
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// A scope of one domain and one /30 flows through discovery, resolution and
/// classification, with every stage leaving its file behind.
#[tokio::test]
async fn full_run_sorts_pairs_by_scope() {
    let (_dir, scope_file, cfg) = setup(SCOPE);
    let pipeline = Pipeline::new(&cfg)
        .with_sources(vec![StaticSource::shared(
            "stub",
            vec!["www.example.com", "other.example.com"],
        )])
        .with_lookup(Box::new(CannedLookup::new(RESOLVER_OUTPUT)));

    let summary = pipeline.run(&scope_file).await.unwrap();

    assert_eq!(summary.addresses, 4);
    assert_eq!(summary.scope_domains, 1);
    assert!(summary.apexes.contains("example.com"));
    assert_eq!(summary.apexes.len(), 1);
    assert_eq!(summary.resolver_tier, Some(Tier::Marked));
    assert_eq!(summary.resolved, 2);

    let in_scope: Vec<_> = summary.classification.in_scope.iter().collect();
    assert_eq!(in_scope.len(), 1);
    assert_eq!(in_scope[0].pair.hostname, "other.example.com");
    assert_eq!(in_scope[0].reason, Reason::AddressMatch);

    let out_of_scope: Vec<_> = summary.classification.out_of_scope.iter().collect();
    assert_eq!(out_of_scope.len(), 1);
    assert_eq!(out_of_scope[0].pair.hostname, "www.example.com");
    assert_eq!(out_of_scope[0].verdict(), Verdict::OutOfScope);

    let out = &cfg.output_dir;
    assert_eq!(
        lines(&out.join(EXPANDED_IPS)),
        vec!["10.0.0.0", "10.0.0.1", "10.0.0.2", "10.0.0.3"]
    );
    assert_eq!(lines(&out.join(SCOPE_DOMAINS)), vec!["example.com"]);
    assert_eq!(lines(&out.join(APEX_DOMAINS)), vec!["example.com"]);
    assert_eq!(
        lines(&out.join(CANDIDATES)),
        vec!["example.com", "other.example.com", "www.example.com"]
    );
    assert_eq!(lines(&out.join(RESOLVED)).len(), 2);
    assert_eq!(lines(&out.join(IN_SCOPE)), vec!["other.example.com 10.0.0.1"]);
    assert_eq!(lines(&out.join(OUT_OF_SCOPE)), vec!["www.example.com 10.0.0.5"]);
    assert_eq!(
        lines(&out.join(SOURCES_DIR).join("stub.txt")),
        vec!["other.example.com", "www.example.com"]
    );
}

#[tokio::test]
async fn failing_source_does_not_stop_the_run() {
    let (_dir, scope_file, cfg) = setup(SCOPE);
    let pipeline = Pipeline::new(&cfg)
        .with_sources(vec![
            Arc::new(FailingSource) as Arc<dyn DiscoverySource>,
            StaticSource::shared("stub", vec!["other.example.com"]),
        ])
        .with_lookup(Box::new(CannedLookup::new(RESOLVER_OUTPUT)));

    let summary = pipeline.run(&scope_file).await.unwrap();

    assert_eq!(summary.sources.len(), 2);
    assert_eq!(summary.sources[0].source, "failing");
    assert!(matches!(summary.sources[0].status, SourceStatus::Failed(_)));
    assert_eq!(summary.sources[1].status, SourceStatus::Completed(1));
    assert_eq!(summary.candidates, 2);
    assert_eq!(summary.classification.in_scope.len(), 1);
}

#[tokio::test]
async fn hostname_listed_in_scope_wins_over_address() {
    let (_dir, scope_file, cfg) = setup("www.example.com\n192.168.1.1\n");
    let pipeline = Pipeline::new(&cfg)
        .with_sources(Vec::new())
        .with_lookup(Box::new(CannedLookup::new(RESOLVER_OUTPUT)));

    let summary = pipeline.run(&scope_file).await.unwrap();

    let hosts: Vec<_> = summary
        .classification
        .in_scope
        .iter()
        .map(|pair| (pair.pair.hostname.as_str(), pair.reason))
        .collect();
    assert_eq!(hosts, vec![("www.example.com", Reason::HostnameMatch)]);
    assert_eq!(summary.classification.out_of_scope.len(), 1);
}

#[tokio::test]
async fn unparseable_resolver_output_yields_empty_classification() {
    let (_dir, scope_file, cfg) = setup(SCOPE);
    let pipeline = Pipeline::new(&cfg)
        .with_sources(Vec::new())
        .with_lookup(Box::new(CannedLookup::new("resolver crashed\n")));

    let summary = pipeline.run(&scope_file).await.unwrap();

    assert_eq!(summary.resolver_tier, None);
    assert!(summary.classification.is_empty());
    assert!(lines(&cfg.output_dir.join(IN_SCOPE)).is_empty());
    assert!(lines(&cfg.output_dir.join(OUT_OF_SCOPE)).is_empty());
}

#[tokio::test]
async fn missing_scope_file_is_fatal() {
    let (dir, _scope_file, cfg) = setup(SCOPE);
    let pipeline = Pipeline::new(&cfg).with_lookup(Box::new(CannedLookup::new("")));

    let err = pipeline
        .run(&dir.path().join("nope.txt"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Scope(ScopeError::MissingInput(_))
    ));
    assert!(!cfg.output_dir.exists());
}

#[tokio::test]
async fn missing_wordlist_is_fatal() {
    let (dir, scope_file, mut cfg) = setup(SCOPE);
    cfg.wordlist = Some(dir.path().join("words.txt"));
    let pipeline = Pipeline::new(&cfg).with_lookup(Box::new(CannedLookup::new("")));

    let err = pipeline.run(&scope_file).await.unwrap_err();

    match err {
        PipelineError::MissingInput { what, .. } => assert_eq!(what, "wordlist"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_resolver_tool_is_fatal() {
    let (_dir, scope_file, cfg) = setup(SCOPE);
    let pipeline = Pipeline::new(&cfg).with_lookup(Box::new(MissingLookup));

    let err = pipeline.run(&scope_file).await.unwrap_err();

    assert!(matches!(err, PipelineError::MissingTool(_)));
}

#[tokio::test]
async fn aborted_review_stops_before_discovery() {
    let (_dir, scope_file, cfg) = setup(SCOPE);
    let lookup = CannedLookup::new(RESOLVER_OUTPUT);
    let calls = lookup.calls.clone();
    let pipeline = Pipeline::new(&cfg)
        .with_sources(vec![StaticSource::shared("stub", vec!["www.example.com"])])
        .with_lookup(Box::new(lookup))
        .with_review(Box::new(AbortReview));

    let err = pipeline.run(&scope_file).await.unwrap_err();

    assert!(matches!(err, PipelineError::Review(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(cfg.output_dir.join(APEX_DOMAINS).exists());
    assert!(!cfg.output_dir.join(CANDIDATES).exists());
}

#[tokio::test]
async fn reviewed_apex_list_drives_discovery() {
    let (_dir, scope_file, cfg) = setup("shop.example.com\napi.example.org\n");
    let recorder = Arc::new(ApexRecorder::default());
    let source: Arc<dyn DiscoverySource> = recorder.clone();
    let pipeline = Pipeline::new(&cfg)
        .with_sources(vec![source])
        .with_lookup(Box::new(CannedLookup::new("")))
        .with_review(Box::new(KeepOnly("example.org")));

    let summary = pipeline.run(&scope_file).await.unwrap();

    let seen = recorder.seen.lock().unwrap().clone();
    assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec!["example.org"]);
    assert_eq!(lines(&cfg.output_dir.join(APEX_DOMAINS)), vec!["example.org"]);
    assert_eq!(summary.apexes.len(), 1);
}

#[tokio::test]
async fn custom_subdomains_join_the_frontier() {
    let (dir, scope_file, mut cfg) = setup(SCOPE);
    let custom = dir.path().join("custom.txt");
    fs::write(&custom, "*.portal.example.net\n").unwrap();
    cfg.custom_subdomains = Some(custom);
    let pipeline = Pipeline::new(&cfg)
        .with_sources(Vec::new())
        .with_lookup(Box::new(CannedLookup::new("")));

    let summary = pipeline.run(&scope_file).await.unwrap();

    assert!(summary.apexes.contains("portal.example.net"));
    assert!(lines(&cfg.output_dir.join(CANDIDATES)).contains(&"portal.example.net".to_string()));
}

#[tokio::test]
async fn rerun_overwrites_with_identical_files() {
    let (_dir, scope_file, cfg) = setup(SCOPE);
    let build = || {
        Pipeline::new(&cfg)
            .with_sources(vec![StaticSource::shared(
                "stub",
                vec!["www.example.com", "other.example.com"],
            )])
            .with_lookup(Box::new(CannedLookup::new(RESOLVER_OUTPUT)))
    };

    build().run(&scope_file).await.unwrap();
    let first = fs::read_to_string(cfg.output_dir.join(IN_SCOPE)).unwrap();
    build().run(&scope_file).await.unwrap();
    let second = fs::read_to_string(cfg.output_dir.join(IN_SCOPE)).unwrap();

    assert_eq!(first, second);
    assert!(!cfg.output_dir.join(format!("{IN_SCOPE}.part")).exists());
}
