use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::map_sqlx_error;
use crate::domain::accounts::{
    Account, AccountChanges, AccountRepository, RepositoryError, Username,
};

const ACCOUNT_COLUMNS: &str = r#"
    id,
    username,
    name,
    website,
    bio,
    email,
    email_confirmed,
    password_hash,
    version,
    created_at,
    updated_at
"#;

#[derive(Debug, Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: AccountRow) -> Result<Account, RepositoryError> {
        let username = Username::new(&row.username).map_err(|err| {
            RepositoryError::Corrupt(format!(
                "stored username {:?} is invalid: {err}",
                row.username
            ))
        })?;

        Ok(Account {
            id: row.id,
            username,
            name: row.name,
            website: row.website,
            bio: row.bio,
            email: row.email,
            email_confirmed: row.email_confirmed,
            password_hash: row.password_hash,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    name: String,
    website: Option<String>,
    bio: Option<String>,
    email: Option<String>,
    email_confirmed: bool,
    password_hash: String,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_username_ci(
        &self,
        username: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE LOWER(username) = LOWER($1)"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(username)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("Failed to look up account", e))?;

        row.map(Self::map_row).transpose()
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Account>, RepositoryError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("Failed to load account", e))?;

        row.map(Self::map_row).transpose()
    }

    async fn insert(&self, account: Account) -> Result<Account, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO accounts (
                id, username, name, website, bio, email, email_confirmed,
                password_hash, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account.id)
            .bind(account.username.as_str())
            .bind(&account.name)
            .bind(&account.website)
            .bind(&account.bio)
            .bind(&account.email)
            .bind(account.email_confirmed)
            .bind(&account.password_hash)
            .bind(account.version)
            .bind(account.created_at)
            .bind(account.updated_at)
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_sqlx_error("Failed to create account", e))?;

        Self::map_row(row)
    }

    async fn apply_changes(
        &self,
        id: Uuid,
        expected_version: i64,
        changes: &AccountChanges,
    ) -> Result<Account, RepositoryError> {
        let mut account =
            self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)?;
        if account.version != expected_version {
            return Err(RepositoryError::Conflict);
        }
        account.apply(changes);

        let sql = format!(
            r#"
            UPDATE accounts
            SET name = $3,
                website = $4,
                bio = $5,
                email = $6,
                email_confirmed = $7,
                password_hash = $8,
                version = $9,
                updated_at = $10
            WHERE id = $1 AND version = $2
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .bind(expected_version)
            .bind(&account.name)
            .bind(&account.website)
            .bind(&account.bio)
            .bind(&account.email)
            .bind(account.email_confirmed)
            .bind(&account.password_hash)
            .bind(account.version)
            .bind(account.updated_at)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("Failed to update account", e))?;

        // A concurrent writer bumped the version between the read and the write.
        row.map(Self::map_row)
            .transpose()?
            .ok_or(RepositoryError::Conflict)
    }
}
