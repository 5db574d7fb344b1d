use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::GithubConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkflowRun {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub head_branch: Option<String>,
}

/// Artifact metadata as returned by the GitHub Actions artifacts API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artifact {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub workflow_run: Option<WorkflowRun>,
}

impl Artifact {
    pub fn head_branch(&self) -> Option<&str> {
        self.workflow_run
            .as_ref()
            .and_then(|run| run.head_branch.as_deref())
    }
}

/// One page of the artifacts listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtifactList {
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

/// Pick the artifact whose reports should be trusted as timing history.
///
/// Only live artifacts with the configured name are considered. Artifacts from
/// the default branch are preferred; the current branch is the fallback (e.g.
/// re-runs of a feature branch that was never merged). Within a branch the
/// newest artifact wins.
pub fn select_artifact<'a>(
    artifacts: &'a [Artifact],
    config: &GithubConfig,
) -> Option<&'a Artifact> {
    let usable: Vec<&Artifact> = artifacts
        .iter()
        .filter(|a| !a.expired && a.name == config.artifact_name)
        .collect();

    for branch in [&config.default_branch, &config.current_branch] {
        if branch.is_empty() {
            continue;
        }
        let newest = usable
            .iter()
            .copied()
            .filter(|a| a.head_branch() == Some(branch.as_str()))
            .reduce(|best, a| if a.created_at > best.created_at { a } else { best });

        if let Some(artifact) = newest {
            tracing::debug!(
                id = artifact.id,
                branch = %branch,
                created_at = %artifact.created_at,
                "Selected artifact"
            );
            return Some(artifact);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_artifact_list() {
        let json = r#"{
            "total_count": 2,
            "artifacts": [
                {
                    "id": 11,
                    "name": "test-results",
                    "size_in_bytes": 1024,
                    "created_at": "2024-03-01T10:00:00Z",
                    "expired": false,
                    "workflow_run": { "id": 7, "head_branch": "main", "head_sha": "abc" }
                },
                {
                    "id": 12,
                    "name": "coverage",
                    "created_at": "2024-03-02T10:00:00Z",
                    "expired": true,
                    "workflow_run": null
                }
            ]
        }"#;

        let list: ArtifactList = serde_json::from_str(json).unwrap();
        assert_eq!(list.artifacts.len(), 2);
        assert_eq!(list.artifacts[0].head_branch(), Some("main"));
        assert_eq!(list.artifacts[0].workflow_run.as_ref().unwrap().id, 7);
        assert!(list.artifacts[1].expired);
        assert_eq!(list.artifacts[1].head_branch(), None);
    }
}
