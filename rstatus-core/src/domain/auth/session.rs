use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use rand::{TryRngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthCryptoError;
use crate::domain::accounts::RepositoryError;

const TOKEN_BYTES: usize = 32;

/// Persisted login session. Only the HMAC of the bearer token is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub account_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl Session {
    pub fn new(account_id: Uuid, token_hash: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            account_id,
            token_hash,
            created_at: now,
            expires_at: now + ttl,
            revoked: false,
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(&self, session: Session) -> Result<(), RepositoryError>;

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Session>, RepositoryError>;

    /// Mark the session revoked. Returns whether a session matched.
    async fn revoke(&self, token_hash: &str) -> Result<bool, RepositoryError>;
}

/// Random opaque bearer token (256 bits, base64url without padding).
pub fn generate_session_token() -> Result<String, AuthCryptoError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| AuthCryptoError::Randomness(err.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
