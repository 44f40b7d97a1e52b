//! Contributor listing for the about page.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One entry of a repository's contributor list, as the hosting API reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub contributions: u32,
}

#[async_trait]
pub trait ContributorSource: Send + Sync {
    /// Contributors of the configured repository, in the order the source
    /// returns them.
    async fn contributors(&self) -> Result<Vec<Contributor>, ContributorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ContributorError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid contributor endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Ascending by login, ignoring case. Ties keep their original order.
pub fn sort_contributors(contributors: &mut [Contributor]) {
    contributors.sort_by(|a, b| {
        a.login.to_lowercase().cmp(&b.login.to_lowercase())
    });
}
