//! Apex domain extraction.
//!
//! Reduces hostnames to the registrable domain the discovery sources should be
//! pointed at. Known multi-label public suffixes get special handling; anything
//! else keeps its last two labels.

use std::collections::BTreeSet;
use std::path::Path;

use thiserror::Error;

/// Multi-label public suffixes, checked in declaration order.
///
/// The first suffix that matches wins. This is not a longest-match lookup: if
/// two entries could both match a hostname, whichever comes first here decides.
pub const MULTI_LABEL_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "me.uk", "net.uk", "com.au", "net.au", "org.au",
    "edu.au", "gov.au", "co.nz", "org.nz", "co.jp", "ne.jp", "or.jp", "co.za", "org.za",
    "com.br", "net.br", "org.br", "com.mx", "com.ar", "com.cn", "net.cn", "org.cn", "com.tr",
    "co.in", "net.in", "org.in", "co.il", "co.kr", "com.sg", "com.my", "com.hk", "com.tw",
];

#[derive(Debug, Clone)]
pub struct ApexExtractor<'a> {
    suffixes: &'a [&'a str],
    custom: BTreeSet<String>,
}

impl Default for ApexExtractor<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl ApexExtractor<'static> {
    pub fn new() -> Self {
        Self {
            suffixes: MULTI_LABEL_SUFFIXES,
            custom: BTreeSet::new(),
        }
    }
}

impl<'a> ApexExtractor<'a> {
    /// Uses a different suffix table. Order still decides ties.
    pub fn with_suffixes(suffixes: &'a [&'a str]) -> Self {
        Self {
            suffixes,
            custom: BTreeSet::new(),
        }
    }

    /// Apex domains supplied by the user. They are merged verbatim, with no
    /// suffix processing.
    pub fn with_custom<I, S>(mut self, custom: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom.extend(custom.into_iter().map(Into::into));
        self
    }

    /// Apex of a single hostname.
    pub fn apex_of(&self, hostname: &str) -> String {
        let hostname = hostname.trim().trim_end_matches('.');

        if let Some(apex) = self.multi_label_apex(hostname) {
            return apex;
        }

        let labels: Vec<&str> = hostname.split('.').collect();
        if labels.len() > 2 {
            labels[labels.len() - 2..].join(".")
        } else {
            hostname.to_string()
        }
    }

    /// Sorted, deduplicated apex set of `hostnames` plus the custom entries.
    pub fn extract<I, S>(&self, hostnames: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        hostnames
            .into_iter()
            .map(|host| self.apex_of(host.as_ref()))
            .filter(|apex| !apex.is_empty())
            .chain(self.custom.iter().cloned())
            .collect()
    }

    /// Keeps only the label immediately in front of the first matching suffix.
    fn multi_label_apex(&self, hostname: &str) -> Option<String> {
        self.suffixes.iter().find_map(|suffix| {
            let prefix = hostname.strip_suffix(suffix)?.strip_suffix('.')?;
            let parent = prefix.rsplit('.').next().filter(|label| !label.is_empty())?;
            Some(format!("{parent}.{suffix}"))
        })
    }
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("review aborted by the user")]
    Aborted,
    #[error("review failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A pause point between stages where a person may inspect and edit a list.
///
/// `file` is the persisted copy of `items`; implementations that let the user
/// edit it return the reloaded contents.
pub trait ReviewCheckpoint: Send + Sync {
    fn review(
        &self,
        stage: &str,
        file: &Path,
        items: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ReviewError>;
}

/// Passes every list through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ReviewCheckpoint for AcceptAll {
    fn review(
        &self,
        _stage: &str,
        _file: &Path,
        items: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ReviewError> {
        Ok(items)
    }
}
