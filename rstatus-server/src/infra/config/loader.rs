use once_cell::sync::Lazy;
use std::{fs, path::PathBuf};
use thiserror::Error;
use url::Url;

use super::{
    models::{
        AuthConfig, Config, ConfigMetadata, ConfigWarnings, ContributorsConfig,
        CorsConfig, DEFAULT_PASSWORD_PEPPER, DEFAULT_TOKEN_KEY, DatabaseConfig,
        MailConfig, ServerConfig,
    },
    sources::{EnvConfig, FileConfig},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("rstatus.toml"),
        PathBuf::from("config/rstatus.toml"),
    ]
});

const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 30;
const DEFAULT_MAIL_FROM: &str = "no-reply@rstat.us";

#[derive(Debug, Default, Clone)]
struct ConfigLoaderOptions {
    config_path: Option<PathBuf>,
    /// Use this instead of the process environment.
    env: Option<EnvConfig>,
}

/// Composes [`Config`] from environment variables, an optional TOML file and
/// built-in defaults, in that order of precedence.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.options.env = Some(env);
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let (env_config, env_file_loaded) = match &self.options.env {
            Some(env) => (env.clone(), false),
            None => {
                let loaded = load_env_file()?;
                (EnvConfig::gather(), loaded)
            }
        };

        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let (config, warnings) = compose_config(
            file_config,
            env_config,
            config_path,
            env_file_loaded,
        )?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env_config.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(path) => path.clone(),
                None => return Ok((None, None)),
            },
        };

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

/// A missing `.env` is fine; a malformed one is not.
fn load_env_file() -> Result<bool, ConfigLoadError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(true),
        Err(dotenvy::Error::Io(_)) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
    env_file_loaded: bool,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if config_path.is_none() {
        warnings.push_with_hint(
            "No rstatus.toml detected; using environment variables and defaults",
            "Create rstatus.toml or pass --config to pin settings",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        auth: file_auth,
        mail: file_mail,
        contributors: file_contributors,
        cors: file_cors,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| "0.0.0.0".to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(3000),
    };

    let database_url = env
        .database_url
        .or(file_database.url)
        .filter(|url| !url.trim().is_empty());
    if let Some(url) = &database_url {
        Url::parse(url)
            .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
    } else {
        warnings.push_with_hint(
            "No database configured; accounts and sessions live in memory",
            "Set DATABASE_URL to persist data in PostgreSQL",
        );
    }
    let database = DatabaseConfig { url: database_url };

    let session_ttl_hours = env
        .session_ttl_hours
        .or(file_auth.session_ttl_hours)
        .unwrap_or(DEFAULT_SESSION_TTL_HOURS);
    if session_ttl_hours <= 0 {
        return Err(ConfigLoadError::InvalidSessionTtl(session_ttl_hours));
    }

    let auth = AuthConfig {
        password_pepper: env
            .auth_password_pepper
            .or(file_auth.password_pepper)
            .unwrap_or_else(|| DEFAULT_PASSWORD_PEPPER.to_string()),
        token_key: env
            .auth_token_key
            .or(file_auth.token_key)
            .unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_string()),
        session_ttl_hours,
    };
    if auth.is_default_pepper() {
        warnings.push_with_hint(
            "Using the built-in password pepper",
            "Set AUTH_PASSWORD_PEPPER before storing real accounts",
        );
    }
    if auth.is_default_token_key() {
        warnings.push_with_hint(
            "Using the built-in session token key",
            "Set AUTH_TOKEN_KEY before issuing real sessions",
        );
    }

    let mail = MailConfig {
        confirmation_enabled: match env.confirmation_disabled {
            Some(disabled) => !disabled,
            None => file_mail.confirmation_enabled.unwrap_or(true),
        },
        from_address: env
            .mail_from
            .or(file_mail.from_address)
            .unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
    };

    let contributors = ContributorsConfig {
        api_base: env
            .github_api_base
            .or(file_contributors.api_base)
            .unwrap_or_else(|| "https://api.github.com".to_string()),
        owner: env
            .contributors_owner
            .or(file_contributors.owner)
            .unwrap_or_else(|| "hotsh".to_string()),
        repository: env
            .contributors_repository
            .or(file_contributors.repository)
            .unwrap_or_else(|| "rstat.us".to_string()),
        timeout_secs: file_contributors.timeout_secs.unwrap_or(10),
    };
    Url::parse(&contributors.api_base).map_err(|source| {
        ConfigLoadError::InvalidContributorsBase {
            url: contributors.api_base.clone(),
            source,
        }
    })?;

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_default(),
    };

    let config = Config {
        server,
        database,
        auth,
        mail,
        contributors,
        cors,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded,
        },
    };

    Ok((config, warnings))
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid database URL")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("invalid contributors API base '{url}'")]
    InvalidContributorsBase {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("session TTL must be positive, got {0} hours")]
    InvalidSessionTtl(i64),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
