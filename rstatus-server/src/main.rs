use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use rstatus_core::application::NewAccount;
use rstatus_server::{
    create_app,
    infra::{
        config::{Config, ConfigLoad, ConfigLoader, ConfigWarnings},
        startup::{build_app_state, connect_database, run_migrations},
    },
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "rstatus-server")]
#[command(about = "rstatus profile and static page server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
    #[command(subcommand)]
    Account(AccountCommand),
    #[command(subcommand)]
    Session(SessionCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[derive(Debug, Subcommand)]
enum AccountCommand {
    /// Create an account
    Create {
        username: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "RSTATUS_ACCOUNT_PASSWORD")]
        password: String,
    },
}

#[derive(Debug, Subcommand)]
enum SessionCommand {
    /// Issue a bearer session token for an account and print it
    Issue { username: String },
    /// Revoke a previously issued bearer token
    Revoke {
        #[arg(env = "RSTATUS_SESSION_TOKEN")]
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_runtime_config(&cli.serve)?;

    match cli.command {
        None => run_server(config).await,
        Some(Command::Db(DbCommand::Migrate)) => run_db_migrate(&config).await,
        Some(Command::Account(AccountCommand::Create {
            username,
            name,
            email,
            password,
        })) => {
            let new_account = NewAccount {
                name: name.unwrap_or_else(|| username.clone()),
                username,
                email,
                password,
            };
            run_account_create(config, new_account).await
        }
        Some(Command::Session(SessionCommand::Issue { username })) => {
            run_session_issue(config, &username).await
        }
        Some(Command::Session(SessionCommand::Revoke { token })) => {
            run_session_revoke(config, &token).await
        }
    }
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = args.config.clone() {
        loader = loader.with_config_path(path);
    }

    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    log_warnings(&warnings);

    Ok(config)
}

fn log_warnings(warnings: &ConfigWarnings) {
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .with_context(|| {
            format!("invalid bind address {}", config.server.bind_address())
        })?;

    info!(
        confirmation_enabled = config.mail.confirmation_enabled,
        persistent = config.database.url.is_some(),
        "starting rstatus on {addr}"
    );

    let state = build_app_state(config).await?;
    let router = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}

async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let Some(url) = config.database.url.as_deref() else {
        bail!("DATABASE_URL is not configured; nothing to migrate");
    };
    let pool = connect_database(url).await?;
    run_migrations(&pool).await
}

async fn run_account_create(
    config: Config,
    new_account: NewAccount,
) -> anyhow::Result<()> {
    ensure_persistent(&config)?;
    let state = build_app_state(config).await?;
    let account = state
        .profiles
        .create_account(new_account)
        .await
        .context("failed to create account")?;

    println!("{} {}", account.id, account.username);
    Ok(())
}

async fn run_session_issue(config: Config, username: &str) -> anyhow::Result<()> {
    ensure_persistent(&config)?;
    let state = build_app_state(config).await?;
    let issued = state
        .sessions
        .issue(username)
        .await
        .context("failed to issue session")?;

    info!(expires_at = %issued.expires_at, "session issued");
    println!("{}", issued.token);
    Ok(())
}

async fn run_session_revoke(config: Config, token: &str) -> anyhow::Result<()> {
    ensure_persistent(&config)?;
    let state = build_app_state(config).await?;
    let revoked = state
        .sessions
        .revoke(token)
        .await
        .context("failed to revoke session")?;

    if !revoked {
        bail!("no active session matches that token");
    }
    info!("session revoked");
    Ok(())
}

// One-shot commands against in-memory storage would lose their result.
fn ensure_persistent(config: &Config) -> anyhow::Result<()> {
    if config.database.url.is_none() {
        bail!("this command needs DATABASE_URL so its result is persisted");
    }
    Ok(())
}
