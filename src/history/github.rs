use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode};

use crate::config::GithubConfig;
use crate::error::{Result, SplitterError};
use crate::history::artifact::{Artifact, ArtifactList};

const PER_PAGE: usize = 100;
const GITHUB_JSON: &str = "application/vnd.github+json";

/// Minimal client for the GitHub Actions artifacts API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("splitter/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    /// List artifacts of the repository, newest pages first as the API returns
    /// them, up to `max_pages` pages.
    pub async fn list_artifacts(&self) -> Result<Vec<Artifact>> {
        tracing::info!(repo = %self.config.repo, "Listing artifacts");

        let mut artifacts = Vec::new();
        for page in 1..=self.config.max_pages {
            let url = format!(
                "{}/repos/{}/actions/artifacts?per_page={}&page={}",
                self.api_url(),
                self.config.repo,
                PER_PAGE,
                page
            );
            let list: ArtifactList = self.get(&url).await?.json().await?;
            let fetched = list.artifacts.len();
            artifacts.extend(list.artifacts);

            if fetched < PER_PAGE {
                break;
            }
        }

        tracing::info!(count = artifacts.len(), "Listed artifacts");
        Ok(artifacts)
    }

    /// Download the zip archive of an artifact.
    pub async fn download_artifact(&self, artifact_id: i64) -> Result<Vec<u8>> {
        tracing::info!(artifact_id, "Downloading artifact");

        let url = format!(
            "{}/repos/{}/actions/artifacts/{}/zip",
            self.api_url(),
            self.config.repo,
            artifact_id
        );
        let bytes = self.get(&url).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    fn api_url(&self) -> &str {
        self.config.api_url.trim_end_matches('/')
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let mut request = self.http.get(url).header(ACCEPT, GITHUB_JSON);
        if !self.config.token.is_empty() {
            request = request.bearer_auth(&self.config.token);
        }

        let response = request.send().await?;
        if response.status() != StatusCode::OK {
            return Err(SplitterError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}
