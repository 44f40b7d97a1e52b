use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::accounts::{Account, AccountRepository, RepositoryError};
use crate::domain::auth::{
    AuthCrypto, AuthCryptoError, Session, SessionRepository,
    generate_session_token,
};

/// Issues and checks opaque bearer sessions.
#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
    accounts: Arc<dyn AccountRepository>,
    crypto: Arc<AuthCrypto>,
    ttl: Duration,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// A freshly issued session. `token` is the only copy of the raw secret.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub account_id: uuid::Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SessionServiceError {
    #[error("no account named {0}")]
    UnknownAccount(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Crypto(#[from] AuthCryptoError),
}

impl SessionService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        accounts: Arc<dyn AccountRepository>,
        crypto: Arc<AuthCrypto>,
        ttl: Duration,
    ) -> Self {
        Self {
            sessions,
            accounts,
            crypto,
            ttl,
        }
    }

    pub async fn issue(
        &self,
        username: &str,
    ) -> Result<IssuedSession, SessionServiceError> {
        let account = self
            .accounts
            .find_by_username_ci(username)
            .await?
            .ok_or_else(|| SessionServiceError::UnknownAccount(username.to_string()))?;

        let token = generate_session_token()?;
        let session =
            Session::new(account.id, self.crypto.hash_token(&token), self.ttl);
        let expires_at = session.expires_at;
        self.sessions.insert(session).await?;

        info!(username = %account.username, %expires_at, "session issued");

        Ok(IssuedSession {
            token,
            account_id: account.id,
            expires_at,
        })
    }

    /// Account behind `token`, if the session exists and is still active.
    pub async fn authenticate(
        &self,
        token: &str,
    ) -> Result<Option<Account>, SessionServiceError> {
        let token_hash = self.crypto.hash_token(token);
        let Some(session) = self.sessions.find_by_token_hash(&token_hash).await?
        else {
            debug!("unknown session token");
            return Ok(None);
        };

        if !session.is_active_at(Utc::now()) {
            debug!(session_id = %session.id, "inactive session presented");
            return Ok(None);
        }

        Ok(self.accounts.find_by_id(session.account_id).await?)
    }

    pub async fn revoke(&self, token: &str) -> Result<bool, SessionServiceError> {
        let token_hash = self.crypto.hash_token(token);
        Ok(self.sessions.revoke(&token_hash).await?)
    }
}
