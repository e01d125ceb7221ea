use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(600);
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(1_800);

/// Runtime settings for one scopr run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Wordlist for the brute-force source. The source is skipped without one.
    pub wordlist: Option<PathBuf>,
    /// Resolver list handed to the brute-force tool.
    pub resolvers: Option<PathBuf>,
    /// Extra hostnames merged in as custom apex domains and candidates.
    pub custom_subdomains: Option<PathBuf>,
    /// Where every stage writes its list files.
    pub output_dir: PathBuf,
    /// Upper bound on a single discovery source.
    pub source_timeout: Duration,
    /// Upper bound on forward resolution of the whole frontier.
    pub resolve_timeout: Duration,
    /// Discovery sources to run.
    pub sources: Vec<SourceKind>,
    /// Binary names of the external tools.
    pub tools: ToolPaths,
    /// Pause for manual review of the apex list.
    pub review: bool,
    pub no_banner: bool,
    /// 0 is normal output, 1 only warnings and final results.
    pub quiet: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wordlist: None,
            resolvers: None,
            custom_subdomains: None,
            output_dir: PathBuf::from("scopr-output"),
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            sources: SourceKind::ALL.to_vec(),
            tools: ToolPaths::default(),
            review: false,
            no_banner: false,
            quiet: 0,
        }
    }
}

/// Binary names (or paths) of the external collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub subfinder: String,
    pub puredns: String,
    pub dnsx: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            subfinder: "subfinder".to_string(),
            puredns: "puredns".to_string(),
            dnsx: "dnsx".to_string(),
        }
    }
}

/// The discovery techniques scopr knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    /// Certificate transparency search on crt.sh.
    CrtSh,
    /// Passive aggregation through subfinder.
    Passive,
    /// Active brute force through puredns.
    Brute,
    /// Reverse lookup of in-scope addresses through dnsx.
    Reverse,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::CrtSh,
        SourceKind::Passive,
        SourceKind::Brute,
        SourceKind::Reverse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::CrtSh => "crtsh",
            SourceKind::Passive => "passive",
            SourceKind::Brute => "brute",
            SourceKind::Reverse => "reverse",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crtsh" | "crt.sh" | "crt" => Ok(SourceKind::CrtSh),
            "passive" | "subfinder" => Ok(SourceKind::Passive),
            "brute" | "bruteforce" | "puredns" => Ok(SourceKind::Brute),
            "reverse" | "ptr" => Ok(SourceKind::Reverse),
            other => Err(format!(
                "unknown source '{other}', expected one of: crtsh, passive, brute, reverse"
            )),
        }
    }
}
