//! Plain-text list persistence.
//!
//! Every stage output is a list of lines. Writes go to a sibling `.part` file
//! that is renamed over the target once complete, so a run interrupted
//! mid-write never leaves a truncated list behind.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::utils::patterns;

/// Writes one item per line, atomically replacing `path`.
///
/// Callers pass sorted, deduplicated collections; this function does not reorder.
pub fn write_lines<I, T>(path: &Path, items: I) -> io::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let part: PathBuf = part_path(path);
    {
        let mut file = io::BufWriter::new(fs::File::create(&part)?);
        for item in items {
            writeln!(file, "{item}")?;
        }
        file.flush()?;
    }
    fs::rename(&part, path)
}

/// Same contract as [`write_lines`], for callers running on the async runtime.
pub async fn write_lines_async<I, T>(path: &Path, items: I) -> io::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let body: String = items.into_iter().map(|item| format!("{item}\n")).collect();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let part: PathBuf = part_path(path);
    tokio::fs::write(&part, body).await?;
    tokio::fs::rename(&part, path).await
}

/// Deletes `path`. A file that is already gone counts as removed.
pub async fn remove_if_present(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Reads non-empty, trimmed lines.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Reads a list file and keeps every hostname-shaped token in it.
pub fn read_hostnames(path: &Path) -> io::Result<BTreeSet<String>> {
    let text = fs::read_to_string(path)?;
    Ok(patterns::extract_hostnames(&text))
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}
