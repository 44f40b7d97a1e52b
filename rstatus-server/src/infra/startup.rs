use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use rstatus_core::domain::auth::AuthCrypto;
use rstatus_core::domain::mail::LoggingMailer;
use rstatus_core::infra::{
    GithubContributorSource, InMemoryAccountRepository,
    InMemorySessionRepository, PostgresAccountRepository,
    PostgresSessionRepository,
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::{info, warn};

use crate::infra::app_state::{AppPorts, AppState};
use crate::infra::config::Config;

const MAX_DB_CONNECTIONS: u32 = 10;

pub async fn connect_database(url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    rstatus_core::MIGRATOR
        .run(pool)
        .await
        .context("database migration failed")?;
    info!("database migrations applied");
    Ok(())
}

pub fn build_crypto(config: &Config) -> Result<Arc<AuthCrypto>> {
    let crypto =
        AuthCrypto::new(&config.auth.password_pepper, &config.auth.token_key)
            .context("invalid authentication secrets")?;
    Ok(Arc::new(crypto))
}

/// Wire stores and adapters according to `config`. With a database URL the
/// schema is migrated first; without one everything stays in memory.
pub async fn build_app_state(config: Config) -> Result<AppState> {
    let crypto = build_crypto(&config)?;
    let ports = build_ports(&config).await?;
    Ok(AppState::new(config, crypto, ports))
}

pub async fn build_ports(config: &Config) -> Result<AppPorts> {
    let mailer = Arc::new(LoggingMailer::new(&config.mail.from_address));
    let contributors = Arc::new(
        GithubContributorSource::new(&config.contributors.source_config())
            .context("failed to build contributor client")?,
    );

    let ports = match config.database.url.as_deref() {
        Some(url) => {
            let pool = connect_database(url).await?;
            run_migrations(&pool).await?;
            AppPorts {
                accounts: Arc::new(PostgresAccountRepository::new(pool.clone())),
                sessions: Arc::new(PostgresSessionRepository::new(pool)),
                mailer,
                contributors,
            }
        }
        None => {
            warn!("running with in-memory storage; data is lost on restart");
            AppPorts {
                accounts: Arc::new(InMemoryAccountRepository::new()),
                sessions: Arc::new(InMemorySessionRepository::new()),
                mailer,
                contributors,
            }
        }
    };

    Ok(ports)
}
