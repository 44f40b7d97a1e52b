use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Username value object with validation
///
/// Represents a validated username that follows the business rules:
/// - 1-30 characters in length
/// - ASCII letters, digits, underscores and dots only
/// - Cannot start or end with a dot
///
/// The stored spelling is preserved. Lookups and uniqueness compare the
/// lowercase [`canonical_key`](Self::canonical_key) instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub const MAX_LEN: usize = 30;

    /// Create a new username with validation
    pub fn new(username: impl AsRef<str>) -> Result<Self, UsernameError> {
        let username = username.as_ref().trim();

        if username.is_empty() {
            return Err(UsernameError::Empty);
        }

        if username.len() > Self::MAX_LEN {
            return Err(UsernameError::TooLong);
        }

        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            return Err(UsernameError::InvalidCharacters);
        }

        if username.starts_with('.') || username.ends_with('.') {
            return Err(UsernameError::InvalidFormat);
        }

        Ok(Self(username.to_string()))
    }

    /// Get the username as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form used for lookups and the uniqueness constraint.
    pub fn canonical_key(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Whether `other` names the same account, ignoring case.
    pub fn matches_ignore_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Username::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when creating a username
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsernameError {
    #[error("Username cannot be empty")]
    Empty,

    #[error("Username too long: maximum 30 characters allowed")]
    TooLong,

    #[error(
        "Username contains invalid characters: only letters, digits, underscore and dot allowed"
    )]
    InvalidCharacters,

    #[error("Username format invalid: cannot start or end with a dot")]
    InvalidFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_usernames() {
        assert!(Username::new("alice").is_ok());
        assert!(Username::new("foo.bar").is_ok());
        assert!(Username::new("LADY_GAGA").is_ok());
        assert!(Username::new("no_email").is_ok());
        assert!(Username::new("a").is_ok());
    }

    #[test]
    fn invalid_usernames() {
        assert_eq!(Username::new(""), Err(UsernameError::Empty));
        assert_eq!(Username::new("a".repeat(31)), Err(UsernameError::TooLong));
        assert_eq!(
            Username::new("alice@bob"),
            Err(UsernameError::InvalidCharacters)
        );
        assert_eq!(
            Username::new("../etc"),
            Err(UsernameError::InvalidCharacters)
        );
        assert_eq!(Username::new(".alice"), Err(UsernameError::InvalidFormat));
        assert_eq!(Username::new("alice."), Err(UsernameError::InvalidFormat));
    }

    #[test]
    fn case_is_preserved_but_ignored_for_matching() {
        let username = Username::new("LADY_GAGA").unwrap();
        assert_eq!(username.as_str(), "LADY_GAGA");
        assert_eq!(username.canonical_key(), "lady_gaga");
        assert!(username.matches_ignore_case("lady_gaga"));
        assert!(username.matches_ignore_case("Lady_Gaga"));
        assert!(!username.matches_ignore_case("lady_gag"));
    }

    #[test]
    fn deserialization_validates() {
        let parsed: Username = serde_json::from_str("\"foo.bar\"").unwrap();
        assert_eq!(parsed.as_str(), "foo.bar");
        assert!(serde_json::from_str::<Username>("\"bad name\"").is_err());
    }
}
