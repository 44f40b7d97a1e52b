//! Domain boundary.
//!
//! Groups the account model, the profile update policy, session hashing and
//! the outbound contracts (mail, contributor listing) so the web layer can
//! depend on cohesive submodules instead of scattered top-level exports.

pub mod accounts;
pub mod auth;
pub mod contributors;
pub mod mail;
pub mod profile;
