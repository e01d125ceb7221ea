//! External tool invocation.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

use scopr_common::debug;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0} was not found on PATH")]
    NotFound(String),
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Status {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// A command-line program scopr shells out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    program: String,
}

impl Tool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Locates the binary, either as a path or on `PATH`.
    pub fn locate(&self) -> Result<PathBuf, ToolError> {
        which::which(&self.program).map_err(|_| ToolError::NotFound(self.program.clone()))
    }

    /// Runs the tool to completion and returns its stdout.
    ///
    /// The child is killed if the returned future is dropped, so a timeout or
    /// an interrupted run does not leave it behind.
    pub async fn run<I, S>(&self, args: I) -> Result<String, ToolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running {:?}", command.as_std());

        let output = command.output().await.map_err(|source| ToolError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ToolError::Status {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
