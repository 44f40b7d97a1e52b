use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::accounts::{
    Account, AccountChanges, AccountRepository, RepositoryError,
};
use crate::domain::auth::{Session, SessionRepository};

/// Process-local account store used when no database is configured and by
/// tests.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_username_ci(
        &self,
        username: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|account| account.username.matches_ignore_case(username))
            .cloned())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Account>, RepositoryError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn insert(&self, account: Account) -> Result<Account, RepositoryError> {
        let mut accounts = self.accounts.write().await;
        let key = account.username.canonical_key();
        if accounts
            .values()
            .any(|existing| existing.username.canonical_key() == key)
        {
            return Err(RepositoryError::UsernameTaken);
        }

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn apply_changes(
        &self,
        id: Uuid,
        expected_version: i64,
        changes: &AccountChanges,
    ) -> Result<Account, RepositoryError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if account.version != expected_version {
            return Err(RepositoryError::Conflict);
        }

        account.apply(changes);
        Ok(account.clone())
    }
}

/// Process-local session store keyed by token hash.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, session: Session) -> Result<(), RepositoryError> {
        self.sessions
            .write()
            .await
            .insert(session.token_hash.clone(), session);
        Ok(())
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Session>, RepositoryError> {
        Ok(self.sessions.read().await.get(token_hash).cloned())
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(token_hash) {
            Some(session) => {
                session.revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accounts::Username;

    fn account(name: &str) -> Account {
        Account::new(Username::new(name).unwrap(), name, "hash")
    }

    #[tokio::test]
    async fn usernames_are_unique_ignoring_case() {
        let repo = InMemoryAccountRepository::new();
        repo.insert(account("LADY_GAGA")).await.unwrap();

        assert!(matches!(
            repo.insert(account("lady_gaga")).await,
            Err(RepositoryError::UsernameTaken)
        ));

        let found = repo.find_by_username_ci("Lady_Gaga").await.unwrap();
        assert_eq!(
            found.map(|a| a.username.to_string()),
            Some("LADY_GAGA".to_string())
        );
    }

    #[tokio::test]
    async fn apply_changes_checks_version() {
        let repo = InMemoryAccountRepository::new();
        let stored = repo.insert(account("alice")).await.unwrap();
        let changes = AccountChanges {
            bio: Some("hello".into()),
            ..Default::default()
        };

        let updated = repo
            .apply_changes(stored.id, stored.version, &changes)
            .await
            .unwrap();
        assert_eq!(updated.version, stored.version + 1);
        assert_eq!(updated.bio.as_deref(), Some("hello"));

        assert!(matches!(
            repo.apply_changes(stored.id, stored.version, &changes).await,
            Err(RepositoryError::Conflict)
        ));
        assert!(matches!(
            repo.apply_changes(Uuid::now_v7(), 1, &changes).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn revoking_marks_session() {
        let repo = InMemorySessionRepository::new();
        let session = Session::new(
            Uuid::now_v7(),
            "digest".into(),
            chrono::Duration::hours(1),
        );
        repo.insert(session).await.unwrap();

        assert!(repo.revoke("digest").await.unwrap());
        assert!(!repo.revoke("missing").await.unwrap());
        let stored = repo.find_by_token_hash("digest").await.unwrap().unwrap();
        assert!(stored.revoked);
    }
}
