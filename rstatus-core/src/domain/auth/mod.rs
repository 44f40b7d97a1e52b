//! Credential hashing and the session contract behind the edit gate.

mod crypto;
mod session;

pub use crypto::{AuthCrypto, AuthCryptoError, HashCost};
pub use session::{Session, SessionRepository, generate_session_token};
