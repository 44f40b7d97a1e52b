//! Account model and persistence contract.

mod account;
mod repository;
mod username;

pub use account::{Account, AccountChanges};
pub use repository::{AccountRepository, RepositoryError};
pub use username::{Username, UsernameError};
