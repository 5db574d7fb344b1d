//! Recovery of per-test timings from a previous CI run.
//!
//! History is read from a test results artifact: a zip of JUnit style
//! reports. The artifact is either fetched from GitHub Actions or read from a
//! local file.
//!
//! # Failure modes
//!
//! - Transport errors and unexpected HTTP statuses are returned to the caller.
//!   A failed fetch cannot be told apart from a first run, so it must not be
//!   silently treated as "no history".
//! - No matching artifact, an unreadable archive, or malformed reports yield
//!   fewer (possibly zero) records and are only logged.

pub mod artifact;
pub mod github;
pub mod report;

use std::path::PathBuf;

use crate::config::{GithubConfig, ReportConfig};
use crate::error::Result;
use crate::scheduler::TestRecord;

pub use artifact::{select_artifact, Artifact};
pub use github::GithubClient;
pub use report::{parse_report, read_archive};

/// Where timing history comes from.
#[derive(Debug, Clone)]
pub enum HistorySource {
    /// Latest matching artifact of a GitHub repository
    Github(GithubConfig),
    /// Artifact zip on the local filesystem
    Archive(PathBuf),
    /// No history; every file gets a zero estimate
    Disabled,
}

impl HistorySource {
    /// Load the records of at most one prior run.
    pub async fn load(&self, reports: &ReportConfig) -> Result<Vec<TestRecord>> {
        match self {
            HistorySource::Disabled => {
                tracing::info!("No history source configured");
                Ok(Vec::new())
            }
            HistorySource::Archive(path) => {
                tracing::info!(path = %path.display(), "Reading artifact archive");
                let bytes = tokio::fs::read(path).await?;
                Ok(read_archive(&bytes, reports))
            }
            HistorySource::Github(config) => {
                let client = GithubClient::new(config.clone())?;
                let artifacts = client.list_artifacts().await?;

                let Some(artifact) = select_artifact(&artifacts, config) else {
                    tracing::warn!(
                        artifact_name = %config.artifact_name,
                        default_branch = %config.default_branch,
                        current_branch = %config.current_branch,
                        "No usable artifact found"
                    );
                    return Ok(Vec::new());
                };

                tracing::info!(
                    id = artifact.id,
                    name = %artifact.name,
                    branch = ?artifact.head_branch(),
                    created_at = %artifact.created_at,
                    "Download artifact"
                );
                let bytes = client.download_artifact(artifact.id).await?;
                Ok(read_archive(&bytes, reports))
            }
        }
    }
}
