use async_trait::async_trait;
use uuid::Uuid;

use super::{Account, AccountChanges, Username};

/// Repository trait for account persistence
///
/// Implementations (in-memory, PostgreSQL) keep the domain logic independent
/// of storage details. Username lookups are always case-insensitive.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account whose username matches `username` ignoring case.
    async fn find_by_username_ci(
        &self,
        username: &str,
    ) -> Result<Option<Account>, RepositoryError>;

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Account>, RepositoryError>;

    /// Persist a new account. Fails with [`RepositoryError::UsernameTaken`]
    /// when another account already uses the same username in any case.
    async fn insert(&self, account: Account) -> Result<Account, RepositoryError>;

    /// Apply `changes` if the stored version still equals `expected_version`.
    ///
    /// Returns the updated account, [`RepositoryError::Conflict`] when another
    /// write got there first, or [`RepositoryError::NotFound`].
    async fn apply_changes(
        &self,
        id: Uuid,
        expected_version: i64,
        changes: &AccountChanges,
    ) -> Result<Account, RepositoryError>;

    /// Check if a username is already taken (case-insensitive)
    async fn username_exists(
        &self,
        username: &Username,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .find_by_username_ci(username.as_str())
            .await?
            .is_some())
    }
}

/// Errors that can occur during repository operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    #[error("Account not found")]
    NotFound,

    #[error("Account was modified concurrently")]
    Conflict,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}
