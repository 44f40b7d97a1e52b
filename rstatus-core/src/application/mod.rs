//! Application services: the use cases the HTTP layer and CLI call into.

pub mod profile_service;
pub mod session_service;

pub use profile_service::{
    NewAccount, ProfileLookup, ProfileService, ProfileServiceError,
    ProfileUpdateOutcome,
};
pub use session_service::{IssuedSession, SessionService, SessionServiceError};
