pub mod run;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser};
use scopr_common::config::{
    Config, DEFAULT_RESOLVE_TIMEOUT, DEFAULT_SOURCE_TIMEOUT, SourceKind, ToolPaths,
};

#[derive(Parser, Debug)]
#[command(name = "scopr", version)]
#[command(about = "Consolidates a recon scope, discovers subdomains and sorts them into in-scope and out-of-scope.")]
pub struct CommandLine {
    /// File listing the scope: domains, IPv4 addresses and CIDR ranges, in any layout
    pub scope_file: PathBuf,

    /// Wordlist for subdomain brute force
    #[arg(short, long)]
    pub wordlist: Option<PathBuf>,

    /// Resolver list for subdomain brute force
    #[arg(short, long)]
    pub resolvers: Option<PathBuf>,

    /// Extra subdomains or apex domains to include
    #[arg(short, long)]
    pub subdomains: Option<PathBuf>,

    /// Output directory [default: scopr-<scope file name>]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Per-source timeout in seconds
    #[arg(short, long, default_value_t = DEFAULT_SOURCE_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Timeout for resolving every candidate, in seconds
    #[arg(long, default_value_t = DEFAULT_RESOLVE_TIMEOUT.as_secs())]
    pub resolve_timeout: u64,

    /// Discovery sources to run (crtsh, passive, brute, reverse) [default: all]
    #[arg(long, value_delimiter = ',')]
    pub sources: Option<Vec<SourceKind>>,

    /// Skip the interactive review of apex domains
    #[arg(long)]
    pub no_review: bool,

    /// Hide the banner
    #[arg(long)]
    pub no_banner: bool,

    /// subfinder binary
    #[arg(long, default_value = "subfinder")]
    pub subfinder_bin: String,

    /// puredns binary
    #[arg(long, default_value = "puredns")]
    pub puredns_bin: String,

    /// dnsx binary
    #[arg(long, default_value = "dnsx")]
    pub dnsx_bin: String,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only warnings, errors and final results
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> Config {
        Config {
            wordlist: self.wordlist.clone(),
            resolvers: self.resolvers.clone(),
            custom_subdomains: self.subdomains.clone(),
            output_dir: self
                .output
                .clone()
                .unwrap_or_else(|| default_output_dir(&self.scope_file)),
            source_timeout: Duration::from_secs(self.timeout),
            resolve_timeout: Duration::from_secs(self.resolve_timeout),
            sources: self
                .sources
                .clone()
                .unwrap_or_else(|| SourceKind::ALL.to_vec()),
            tools: ToolPaths {
                subfinder: self.subfinder_bin.clone(),
                puredns: self.puredns_bin.clone(),
                dnsx: self.dnsx_bin.clone(),
            },
            review: !self.no_review && console::user_attended(),
            no_banner: self.no_banner,
            quiet: u8::from(self.quiet),
        }
    }
}

fn default_output_dir(scope_file: &Path) -> PathBuf {
    let stem = scope_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scope".to_string());
    PathBuf::from(format!("scopr-{stem}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_the_config() {
        let cmd = CommandLine::try_parse_from(["scopr", "targets/acme.txt", "--no-review"]).unwrap();
        let cfg = cmd.to_config();

        assert_eq!(cfg.output_dir, PathBuf::from("scopr-acme"));
        assert_eq!(cfg.sources, SourceKind::ALL.to_vec());
        assert_eq!(cfg.source_timeout, DEFAULT_SOURCE_TIMEOUT);
        assert_eq!(cfg.resolve_timeout, DEFAULT_RESOLVE_TIMEOUT);
        assert_eq!(cfg.tools, ToolPaths::default());
        assert!(!cfg.review);
        assert_eq!(cfg.quiet, 0);
    }

    #[test]
    fn overrides_are_applied() {
        let cmd = CommandLine::try_parse_from([
            "scopr",
            "scope.txt",
            "-w",
            "words.txt",
            "-r",
            "resolvers.txt",
            "-s",
            "extra.txt",
            "-o",
            "out",
            "-t",
            "30",
            "--sources",
            "crtsh,reverse",
            "--dnsx-bin",
            "/opt/dnsx",
            "-q",
        ])
        .unwrap();
        let cfg = cmd.to_config();

        assert_eq!(cfg.wordlist, Some(PathBuf::from("words.txt")));
        assert_eq!(cfg.resolvers, Some(PathBuf::from("resolvers.txt")));
        assert_eq!(cfg.custom_subdomains, Some(PathBuf::from("extra.txt")));
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.source_timeout, Duration::from_secs(30));
        assert_eq!(cfg.sources, vec![SourceKind::CrtSh, SourceKind::Reverse]);
        assert_eq!(cfg.tools.dnsx, "/opt/dnsx");
        assert_eq!(cfg.quiet, 1);
    }

    #[test]
    fn unknown_source_is_rejected() {
        let res = CommandLine::try_parse_from(["scopr", "scope.txt", "--sources", "shodan"]);
        assert!(res.is_err());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        let res = CommandLine::try_parse_from(["scopr", "scope.txt", "-v", "-q"]);
        assert!(res.is_err());
    }
}
