//! # rstatus Core
//!
//! Core library for rstatus, providing the account model, the profile update
//! policy, and the ports the web layer talks through.
//!
//! ## Overview
//!
//! - **Accounts**: Case-preserving usernames with case-insensitive lookup
//! - **Profile Updates**: A pure policy deciding what an edit persists and
//!   whether the new email needs verification
//! - **Sessions**: Opaque bearer tokens hashed before persistence
//! - **Contributors**: Listing the people behind the project for the about page
//! - **Storage**: Trait-based account and session stores with in-memory and
//!   PostgreSQL backends
//!
//! ## Feature Flags
//!
//! - `database`: Enables the PostgreSQL (SQLx) stores and embedded migrations
//!
//! ## Example
//!
//! ```
//! use rstatus_core::domain::accounts::{Account, Username};
//! use rstatus_core::domain::profile::{ProfileChangeRequest, ProfileUpdatePolicy};
//! use serde_json::json;
//!
//! let mut account = Account::new(Username::new("foo.bar").unwrap(), "Foo Bar", "hash");
//! account.email = Some("old@x.com".to_string());
//!
//! let request = ProfileChangeRequest::from_json(&json!({ "email": "new@x.com" })).unwrap();
//! let update = ProfileUpdatePolicy::evaluate(Some(&account), &request).unwrap();
//! assert!(update.send_verification_email);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Route constants and response envelopes shared by the server and its tests
pub mod api;

/// Use-case services composing the domain with its ports
pub mod application;

/// Accounts, profile policy, sessions, mail and contributor contracts
pub mod domain;

/// Adapters implementing the domain ports
pub mod infra;

#[cfg(feature = "database")]
#[cfg_attr(docsrs, doc(cfg(feature = "database")))]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
