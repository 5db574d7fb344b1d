use crate::error::{Result, SplitterError};
use crate::scheduler::PartitionOrder;

const REF_HEADS_PREFIX: &str = "refs/heads/";

/// Which node this process is and how many nodes share the test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitConfig {
    /// Total number of parallel nodes (>= 1)
    pub node_count: usize,
    /// Index of this node in `[0, node_count)`
    pub node_index: usize,
    /// Order in which files are fed to the partitioner
    pub order: PartitionOrder,
}

impl SplitConfig {
    /// Validate raw values from the CLI / environment.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending value if `node_count` is not
    /// positive or `node_index` is outside `[0, node_count)`.
    pub fn new(node_count: i64, node_index: i64) -> Result<Self> {
        let count = usize::try_from(node_count)
            .ok()
            .filter(|&n| n > 0)
            .ok_or(SplitterError::InvalidNodeCount(node_count))?;

        let index = usize::try_from(node_index)
            .ok()
            .filter(|&i| i < count)
            .ok_or(SplitterError::NodeIndexOutOfRange {
                index: node_index,
                node_count: count,
            })?;

        Ok(Self {
            node_count: count,
            node_index: index,
            order: PartitionOrder::default(),
        })
    }

    pub fn with_order(mut self, order: PartitionOrder) -> Self {
        self.order = order;
        self
    }
}

/// Names of the report files to read inside a test results artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub prefix: String,
    pub suffix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            prefix: "rspec-".to_string(),
            suffix: ".xml".to_string(),
        }
    }
}

impl ReportConfig {
    pub fn matches(&self, entry_name: &str) -> bool {
        entry_name.starts_with(&self.prefix) && entry_name.ends_with(&self.suffix)
    }
}

/// Settings for fetching timing history from GitHub Actions artifacts.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// REST API base URL
    pub api_url: String,
    /// Repository in `owner/repo` form
    pub repo: String,
    /// Bearer token for the API
    pub token: String,
    /// Name of the artifact holding test reports
    pub artifact_name: String,
    /// Branch whose artifacts are preferred
    pub default_branch: String,
    /// Branch of the current run, used when the default branch has no artifacts
    pub current_branch: String,
    /// Maximum number of artifact list pages to fetch (100 artifacts each)
    pub max_pages: u32,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            repo: String::new(),
            token: String::new(),
            artifact_name: "test-results".to_string(),
            default_branch: "main".to_string(),
            current_branch: String::new(),
            max_pages: 10,
        }
    }
}

impl GithubConfig {
    pub fn new(repo: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            token: token.into(),
            ..Default::default()
        }
    }

    /// Set the current branch from a branch name or a full `refs/heads/...` ref.
    pub fn with_branch(mut self, git_ref: &str) -> Self {
        self.current_branch = branch_name(git_ref).to_string();
        self
    }
}

/// Strip a `refs/heads/` prefix so a git ref compares equal to a branch name.
pub fn branch_name(git_ref: &str) -> &str {
    git_ref.strip_prefix(REF_HEADS_PREFIX).unwrap_or(git_ref)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_config_valid() {
        let cfg = SplitConfig::new(10, 9).unwrap();
        assert_eq!(cfg.node_count, 10);
        assert_eq!(cfg.node_index, 9);
        assert_eq!(cfg.order, PartitionOrder::ByName);
    }

    #[test]
    fn split_config_rejects_non_positive_node_count() {
        assert!(matches!(
            SplitConfig::new(0, 0),
            Err(SplitterError::InvalidNodeCount(0))
        ));
        assert!(matches!(
            SplitConfig::new(-3, 0),
            Err(SplitterError::InvalidNodeCount(-3))
        ));
    }

    #[test]
    fn split_config_rejects_out_of_range_index() {
        assert!(matches!(
            SplitConfig::new(3, 5),
            Err(SplitterError::NodeIndexOutOfRange {
                index: 5,
                node_count: 3
            })
        ));
        assert!(matches!(
            SplitConfig::new(3, 3),
            Err(SplitterError::NodeIndexOutOfRange { index: 3, .. })
        ));
        assert!(matches!(
            SplitConfig::new(3, -1),
            Err(SplitterError::NodeIndexOutOfRange { index: -1, .. })
        ));
    }

    #[test]
    fn split_config_with_order() {
        let cfg = SplitConfig::new(2, 0)
            .unwrap()
            .with_order(PartitionOrder::LongestFirst);
        assert_eq!(cfg.order, PartitionOrder::LongestFirst);
    }

    #[test]
    fn report_config_matches() {
        let cfg = ReportConfig::default();
        assert!(cfg.matches("rspec-0.xml"));
        assert!(cfg.matches("rspec-node-12.xml"));
        assert!(!cfg.matches("coverage.xml"));
        assert!(!cfg.matches("rspec-0.json"));
    }

    #[test]
    fn github_config_default() {
        let cfg = GithubConfig::default();
        assert_eq!(cfg.api_url, "https://api.github.com");
        assert_eq!(cfg.artifact_name, "test-results");
        assert_eq!(cfg.default_branch, "main");
        assert_eq!(cfg.max_pages, 10);
        assert!(cfg.repo.is_empty());
    }

    #[test]
    fn github_config_branch_from_ref() {
        let cfg = GithubConfig::new("owner/repo", "t").with_branch("refs/heads/feature/x");
        assert_eq!(cfg.repo, "owner/repo");
        assert_eq!(cfg.current_branch, "feature/x");

        let cfg = GithubConfig::default().with_branch("feature/y");
        assert_eq!(cfg.current_branch, "feature/y");
    }
}
