use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use scopr_common::config::Config;
use scopr_common::warn;
use scopr_core::apex::{AcceptAll, ReviewCheckpoint};
use scopr_core::pipeline::{IN_SCOPE, OUT_OF_SCOPE, Pipeline, RunSummary};

use crate::terminal::{colors, format, print, review::TerminalReview};

pub async fn run(scope_file: &Path, cfg: &Config) -> anyhow::Result<()> {
    let review: Box<dyn ReviewCheckpoint> = if cfg.review {
        Box::new(TerminalReview::new(cfg.quiet))
    } else {
        Box::new(AcceptAll)
    };
    let pipeline = Pipeline::new(cfg).with_review(review);

    print::section("consolidating scope", cfg.quiet);
    let start = Instant::now();

    let summary = tokio::select! {
        res = pipeline.run(scope_file) => res.context("scope consolidation failed")?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, files already written to {} are complete", cfg.output_dir.display());
            anyhow::bail!("interrupted by user");
        }
    };

    print_results(&summary);
    print_summary(&summary, start.elapsed(), cfg.quiet);
    Ok(())
}

fn print_results(summary: &RunSummary) {
    print::blank();
    print::section("in scope", 0);

    let in_scope = &summary.classification.in_scope;
    if in_scope.is_empty() {
        print::nothing_in_scope(&format::why_nothing_in_scope(summary));
        return;
    }

    for (reason, hosts) in format::group_by_reason(in_scope) {
        print::tree(format::reason_title(reason, hosts.len()), &format::host_rows(&hosts));
    }
}

fn print_summary(summary: &RunSummary, elapsed: Duration, quiet: u8) {
    if quiet > 0 {
        return;
    }
    print::blank();
    print::section("summary", quiet);

    let addresses = if summary.skipped_ranges > 0 {
        format!("{} ({} malformed range(s) skipped)", summary.addresses, summary.skipped_ranges)
    } else {
        summary.addresses.to_string()
    };
    let resolved = match summary.resolver_tier {
        Some(tier) => format!("{} pair(s), {} parsing", summary.resolved, tier),
        None => format!("{} pair(s)", summary.resolved),
    };
    let classification = &summary.classification;
    let in_scope = format!(
        "{} pair(s) across {} host(s)",
        classification.in_scope.len(),
        classification.in_scope_hosts().len()
    );

    let mut fields = print::Fields::new();
    fields
        .push("scope domains", summary.scope_domains.to_string())
        .push("addresses", addresses)
        .push("apex domains", summary.apexes.len().to_string());
    for report in &summary.sources {
        fields.push(report.source.as_str(), format::source_status(report));
    }
    fields
        .push("candidates", summary.candidates.to_string())
        .push("resolved", resolved)
        .push("in scope", in_scope.color(colors::OK))
        .push("out of scope", format!("{} pair(s)", classification.out_of_scope.len()))
        .push("output", summary.output_dir.display().to_string());
    fields.render();

    print::blank();
    print::note(format!(
        "full lists in {} and {}, finished in {:.2}s",
        IN_SCOPE.color(colors::ACCENT),
        OUT_OF_SCOPE.color(colors::ACCENT),
        elapsed.as_secs_f64()
    ));
    print::rule();
}
