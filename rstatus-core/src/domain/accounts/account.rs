use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Username;

/// Account aggregate: identity plus the editable profile fields.
///
/// The password hash is never serialized to prevent accidental exposure.
/// `version` increases with every persisted change and backs the optimistic
/// concurrency check in [`AccountRepository::apply_changes`].
///
/// [`AccountRepository::apply_changes`]: super::AccountRepository::apply_changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    /// Unique, case-preserving username
    pub username: Username,
    pub name: String,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub email_confirmed: bool,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        username: Username,
        name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::now_v7(),
            username,
            name: name.into(),
            website: None,
            bio: None,
            email: None,
            email_confirmed: false,
            password_hash: password_hash.into(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a change set and stamp the bookkeeping fields.
    pub fn apply(&mut self, changes: &AccountChanges) {
        changes.apply_to(self);
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

/// Field-level change set handed to the account store.
///
/// Built by the application layer from a successful profile evaluation after
/// the password has been hashed. `None` leaves a field untouched; an empty
/// string clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub email_confirmed: Option<bool>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Write the changed fields into `account`, leaving `version` and
    /// `updated_at` alone. Applying the same change set twice is a no-op the
    /// second time.
    pub fn apply_to(&self, account: &mut Account) {
        if let Some(name) = &self.name {
            account.name = name.clone();
        }
        if let Some(website) = &self.website {
            account.website = non_empty(website);
        }
        if let Some(bio) = &self.bio {
            account.bio = non_empty(bio);
        }
        if let Some(email) = &self.email {
            account.email = non_empty(email);
        }
        if let Some(hash) = &self.password_hash {
            account.password_hash = hash.clone();
        }
        if let Some(confirmed) = self.email_confirmed {
            account.email_confirmed = confirmed;
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        let mut account =
            Account::new(Username::new("foo.bar").unwrap(), "Foo Bar", "hash-1");
        account.email = Some("old@x.com".to_string());
        account.email_confirmed = true;
        account
    }

    #[test]
    fn applying_changes_bumps_version() {
        let mut account = account();
        let changes = AccountChanges {
            bio: Some("To be or not to be".to_string()),
            ..Default::default()
        };

        account.apply(&changes);

        assert_eq!(account.bio.as_deref(), Some("To be or not to be"));
        assert_eq!(account.version, 2);
        assert_eq!(account.name, "Foo Bar");
    }

    #[test]
    fn empty_strings_clear_optional_fields() {
        let mut account = account();
        account.website = Some("http://test.com".to_string());

        AccountChanges {
            website: Some(String::new()),
            email: Some(String::new()),
            ..Default::default()
        }
        .apply_to(&mut account);

        assert_eq!(account.website, None);
        assert_eq!(account.email, None);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let changes = AccountChanges {
            name: Some("Mark Zuckerberg".to_string()),
            email: Some("new@x.com".to_string()),
            password_hash: Some("hash-2".to_string()),
            email_confirmed: Some(false),
            ..Default::default()
        };

        let mut once = account();
        changes.apply_to(&mut once);
        let mut twice = once.clone();
        changes.apply_to(&mut twice);

        assert_eq!(once, twice);
        assert_eq!(twice.password_hash, "hash-2");
        assert!(!twice.email_confirmed);
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let value = serde_json::to_value(account()).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["username"], "foo.bar");
    }
}
