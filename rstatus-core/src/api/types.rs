use serde::{Deserialize, Serialize};

use crate::domain::accounts::Account;
use crate::domain::contributors::Contributor;

/// Envelope used by every JSON endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }
}

/// Public view of a profile. Email and credentials never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    pub username: String,
    pub name: String,
    pub website: Option<String>,
    pub bio: Option<String>,
    /// True when the viewer owns this profile and may edit it
    pub editable: bool,
}

impl ProfileView {
    pub fn from_account(account: &Account, editable: bool) -> Self {
        Self {
            username: account.username.to_string(),
            name: account.name.clone(),
            website: account.website.clone(),
            bio: account.bio.clone(),
            editable,
        }
    }
}

/// Fields pre-filled in the edit form for the account owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableProfile {
    pub username: String,
    pub name: String,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub email_confirmed: bool,
}

impl From<&Account> for EditableProfile {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username.to_string(),
            name: account.name.clone(),
            website: account.website.clone(),
            bio: account.bio.clone(),
            email: account.email.clone(),
            email_confirmed: account.email_confirmed,
        }
    }
}

/// Result of a successful profile save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSaved {
    pub profile: ProfileView,
    pub verification_email_sent: bool,
}

/// Body of the informational pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPage {
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<ContributorView>,
}

impl StaticPage {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            contributors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorView {
    pub login: String,
    pub profile_url: Option<String>,
    pub avatar_url: Option<String>,
    pub contributions: u32,
}

impl From<Contributor> for ContributorView {
    fn from(contributor: Contributor) -> Self {
        Self {
            login: contributor.login,
            profile_url: contributor.html_url,
            avatar_url: contributor.avatar_url,
            contributions: contributor.contributions,
        }
    }
}
