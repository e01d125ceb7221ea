//! Passive aggregation through subfinder.

use std::collections::BTreeSet;
use std::ffi::OsStr;

use async_trait::async_trait;
use tempfile::NamedTempFile;

use scopr_common::utils::{files, patterns};

use super::{DiscoveryInput, DiscoverySource, SourceError};
use crate::tools::Tool;

pub struct PassiveSource {
    tool: Tool,
}

impl PassiveSource {
    pub fn new(program: &str) -> Self {
        Self {
            tool: Tool::new(program),
        }
    }
}

#[async_trait]
impl DiscoverySource for PassiveSource {
    fn name(&self) -> &str {
        "passive"
    }

    async fn discover(&self, input: &DiscoveryInput) -> Result<BTreeSet<String>, SourceError> {
        if input.apexes.is_empty() {
            return Err(SourceError::Skipped("no apex domains to search".into()));
        }
        self.tool
            .locate()
            .map_err(|e| SourceError::Skipped(e.to_string()))?;

        let domains = NamedTempFile::new()?;
        files::write_lines(domains.path(), &input.apexes)?;

        let args: [&OsStr; 3] = [
            OsStr::new("-dL"),
            domains.path().as_os_str(),
            OsStr::new("-silent"),
        ];
        let stdout = self.tool.run(args).await?;

        Ok(patterns::extract_hostnames(&stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_skipped() {
        let source = PassiveSource::new("nonexistent_subfinder_xyz");
        let input = DiscoveryInput {
            apexes: ["example.com".to_string()].into_iter().collect(),
            ..DiscoveryInput::default()
        };
        let err = source.discover(&input).await.unwrap_err();
        assert!(matches!(err, SourceError::Skipped(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn parses_tool_output_lines() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-subfinder");
        std::fs::write(
            &script,
            "#!/bin/sh\nprintf 'www.example.com\\napi.example.com,source=crtsh\\n\\n'\n",
        )
        .unwrap();
        make_executable(&script);

        let source = PassiveSource::new(script.to_str().unwrap());
        let input = DiscoveryInput {
            apexes: ["example.com".to_string()].into_iter().collect(),
            ..DiscoveryInput::default()
        };
        let hosts = source.discover(&input).await.unwrap();
        let hosts: Vec<&str> = hosts.iter().map(String::as_str).collect();
        assert_eq!(hosts, vec!["api.example.com", "www.example.com"]);
    }

    #[cfg(unix)]
    fn make_executable(path: &std::path::Path) {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).unwrap();
    }
}
