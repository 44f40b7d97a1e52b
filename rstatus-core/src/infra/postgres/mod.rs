//! PostgreSQL-backed stores. Schema lives in `migrations/`.

mod accounts;
mod sessions;

pub use accounts::PostgresAccountRepository;
pub use sessions::PostgresSessionRepository;

use crate::domain::accounts::RepositoryError;

const UNIQUE_VIOLATION: &str = "23505";
/// Case-insensitive username index from the accounts migration.
const USERNAME_UNIQUE_INDEX: &str = "accounts_username_lower_idx";

fn map_sqlx_error(context: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(USERNAME_UNIQUE_INDEX) =>
        {
            RepositoryError::UsernameTaken
        }
        other => RepositoryError::Database(format!("{context}: {other}")),
    }
}
