use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use hmac::{Hmac, Mac};
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, Salt, SaltString};
use rand::{TryRngCore, rngs::OsRng};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

type TokenMac = Hmac<Sha256>;

const SALT_BYTES: usize = Salt::RECOMMENDED_LENGTH;
const HASH_BYTES: usize = 32;

/// Argon2id work factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashCost {
    /// 64 MiB, three passes. What stored accounts use.
    Standard,
    /// Minimal cost so test suites stay fast.
    Fast,
}

impl HashCost {
    fn params(self) -> Result<Params, AuthCryptoError> {
        let (memory_kib, passes) = match self {
            HashCost::Standard => (64 * 1024, 3),
            HashCost::Fast => (8, 1),
        };
        Params::new(memory_kib, passes, 1, Some(HASH_BYTES))
            .map_err(|err| AuthCryptoError::Params(err.to_string()))
    }
}

/// Password and session-token hashing for accounts.
///
/// Passwords go through Argon2id with the account pepper appended; session
/// tokens are stored as a keyed SHA-256 MAC so a leaked table cannot be
/// replayed.
pub struct AuthCrypto {
    hasher: Argon2<'static>,
    pepper: Zeroizing<Vec<u8>>,
    token_key: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for AuthCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCrypto")
            .field("params", self.hasher.params())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum AuthCryptoError {
    #[error("{0} must not be empty")]
    MissingSecret(&'static str),
    #[error("argon2 rejected its parameters: {0}")]
    Params(String),
    #[error("could not hash password: {0}")]
    Hashing(String),
    #[error("system randomness unavailable: {0}")]
    Randomness(String),
}

impl AuthCrypto {
    pub fn new(
        pepper: impl AsRef<[u8]>,
        token_key: impl AsRef<[u8]>,
    ) -> Result<Self, AuthCryptoError> {
        Self::with_cost(pepper, token_key, HashCost::Standard)
    }

    /// Never use outside tests: the Argon2 cost is trivial.
    pub fn insecure_fast(
        pepper: impl AsRef<[u8]>,
        token_key: impl AsRef<[u8]>,
    ) -> Result<Self, AuthCryptoError> {
        Self::with_cost(pepper, token_key, HashCost::Fast)
    }

    pub fn with_cost(
        pepper: impl AsRef<[u8]>,
        token_key: impl AsRef<[u8]>,
        cost: HashCost,
    ) -> Result<Self, AuthCryptoError> {
        let pepper = secret("password pepper", pepper.as_ref())?;
        let token_key = secret("session token key", token_key.as_ref())?;

        Ok(Self {
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, cost.params()?),
            pepper,
            token_key,
        })
    }

    /// PHC string for `password`, salted freshly on every call.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthCryptoError> {
        let mut salt = [0u8; SALT_BYTES];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|err| AuthCryptoError::Randomness(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt)
            .map_err(|err| AuthCryptoError::Hashing(err.to_string()))?;

        self.hasher
            .hash_password(&self.with_pepper(password), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AuthCryptoError::Hashing(err.to_string()))
    }

    /// `Ok(false)` on a wrong password; errors only for an unreadable hash.
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<bool, AuthCryptoError> {
        let stored = PasswordHash::new(stored_hash)
            .map_err(|err| AuthCryptoError::Hashing(err.to_string()))?;
        Ok(self
            .hasher
            .verify_password(&self.with_pepper(password), &stored)
            .is_ok())
    }

    /// Lowercase hex MAC of a session token, as kept in the session store.
    pub fn hash_token(&self, token: &str) -> String {
        let mut mac = TokenMac::new_from_slice(&self.token_key)
            .expect("HMAC takes keys of any length");
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn with_pepper(&self, password: &str) -> Zeroizing<Vec<u8>> {
        let mut material = Zeroizing::new(password.as_bytes().to_vec());
        material.extend_from_slice(&self.pepper);
        material
    }
}

fn secret(name: &'static str, raw: &[u8]) -> Result<Zeroizing<Vec<u8>>, AuthCryptoError> {
    if raw.is_empty() {
        return Err(AuthCryptoError::MissingSecret(name));
    }
    Ok(Zeroizing::new(raw.to_vec()))
}
