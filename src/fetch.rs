//! Downloads configured source CSVs into the raw data directory.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use tracing::info;

use crate::config::SourceConfig;
use crate::error::PipelineError;

/// What happened to one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// File already present; nothing downloaded.
    Skipped(PathBuf),
    /// File downloaded and written.
    Downloaded(PathBuf),
}

/// Local path a source is saved to.
pub fn target_path(source: &SourceConfig, raw_dir: &Path) -> PathBuf {
    raw_dir.join(format!("{}.csv", source.name))
}

/// Downloads one source unless its file already exists.
///
/// # Errors
///
/// Returns a `PipelineError` on HTTP failure (including non-success status)
/// or if the file cannot be written.
pub fn download_source(
    client: &Client,
    source: &SourceConfig,
    raw_dir: &Path,
) -> Result<FetchOutcome, PipelineError> {
    let out = target_path(source, raw_dir);
    if out.exists() {
        info!(path = %out.display(), "already downloaded, skipping");
        return Ok(FetchOutcome::Skipped(out));
    }

    info!(url = %source.url, "downloading");
    let bytes = client
        .get(&source.url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .and_then(reqwest::blocking::Response::bytes)
        .map_err(|e| PipelineError::Fetch {
            url: source.url.clone(),
            source: e,
        })?;

    fs::create_dir_all(raw_dir).map_err(|e| PipelineError::io(raw_dir, e))?;
    fs::write(&out, &bytes).map_err(|e| PipelineError::io(&out, e))?;
    info!(path = %out.display(), bytes = bytes.len(), "saved");
    Ok(FetchOutcome::Downloaded(out))
}

/// Downloads every source in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the first `PipelineError` encountered.
pub fn download_all(
    sources: &[SourceConfig],
    raw_dir: &Path,
) -> Result<Vec<FetchOutcome>, PipelineError> {
    let client = Client::new();
    sources
        .iter()
        .map(|s| download_source(&client, s, raw_dir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_file_is_skipped_without_network() {
        let dir = tempfile::tempdir().expect("tempdir");
        let raw = dir.path().to_path_buf();
        let source = SourceConfig {
            name: "sample_energy".to_string(),
            url: "http://invalid.invalid/never-fetched.csv".to_string(),
        };
        fs::write(target_path(&source, &raw), "a\n1\n").expect("seed file");
        let outcome = download_source(&Client::new(), &source, &raw);
        assert_eq!(
            outcome.expect("existing file should not be fetched"),
            FetchOutcome::Skipped(raw.join("sample_energy.csv"))
        );
    }
}
