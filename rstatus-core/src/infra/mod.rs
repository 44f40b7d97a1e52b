//! Adapters behind the domain ports.

pub mod github;
pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;

pub use github::{GithubContributorSource, GithubSourceConfig};
pub use memory::{InMemoryAccountRepository, InMemorySessionRepository};
#[cfg(feature = "database")]
pub use postgres::{PostgresAccountRepository, PostgresSessionRepository};
