use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::domain::contributors::{
    Contributor, ContributorError, ContributorSource,
};

const USER_AGENT: &str = concat!("rstatus/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: &str = "100";

/// Where to fetch contributors from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubSourceConfig {
    pub api_base: String,
    pub owner: String,
    pub repository: String,
    pub timeout: Duration,
}

impl Default for GithubSourceConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            owner: "hotsh".to_string(),
            repository: "rstat.us".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Reads `GET /repos/{owner}/{repo}/contributors` from the GitHub REST API.
pub struct GithubContributorSource {
    http: reqwest::Client,
    endpoint: Url,
}

impl fmt::Debug for GithubContributorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubContributorSource")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl GithubContributorSource {
    pub fn new(config: &GithubSourceConfig) -> Result<Self, ContributorError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            endpoint: contributors_endpoint(config)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn contributors_endpoint(
    config: &GithubSourceConfig,
) -> Result<Url, ContributorError> {
    let mut base = Url::parse(&config.api_base)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let mut endpoint = base.join(&format!(
        "repos/{}/{}/contributors",
        config.owner, config.repository
    ))?;
    endpoint.query_pairs_mut().append_pair("per_page", PER_PAGE);
    Ok(endpoint)
}

#[async_trait]
impl ContributorSource for GithubContributorSource {
    async fn contributors(&self) -> Result<Vec<Contributor>, ContributorError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let contributors = response.json::<Vec<Contributor>>().await?;
            debug!(count = contributors.len(), "fetched contributors");
            return Ok(contributors);
        }

        #[derive(Debug, Deserialize)]
        struct GithubErrorBody {
            #[serde(default)]
            message: Option<String>,
        }

        let message = response
            .json::<GithubErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| {
                format!("GitHub request failed with status {status}")
            });

        match status.as_u16() {
            // GitHub reports exhausted quotas as 403 as well as 429.
            403 if message.contains("rate limit") => {
                Err(ContributorError::RateLimited)
            }
            429 => Err(ContributorError::RateLimited),
            code => Err(ContributorError::Api {
                status: code,
                message,
            }),
        }
    }
}
