//! Profile editing: request parsing and the update policy.
//!
//! The policy is pure. It never touches storage or mail; it only computes the
//! patch to persist and whether a verification email is owed. The
//! [`ProfileService`](crate::application::ProfileService) carries that intent
//! out.

mod error;
mod policy;
mod request;

pub use error::ProfileUpdateError;
pub use policy::{ProfilePatch, ProfileUpdate, ProfileUpdatePolicy, ProfileUpdateResult};
pub use request::{PlainPassword, ProfileChangeRequest, ProfileField};
