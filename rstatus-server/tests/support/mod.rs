#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use rstatus_core::domain::accounts::{Account, AccountRepository, Username};
use rstatus_core::domain::auth::AuthCrypto;
use rstatus_core::domain::contributors::{
    Contributor, ContributorError, ContributorSource,
};
use rstatus_core::domain::mail::{MailerError, VerificationMailer};
use rstatus_core::infra::{InMemoryAccountRepository, InMemorySessionRepository};
use rstatus_server::{
    AppState, create_app,
    infra::app_state::AppPorts,
    infra::config::{
        AuthConfig, Config, ConfigMetadata, ContributorsConfig, CorsConfig,
        DatabaseConfig, MailConfig, ServerConfig,
    },
};
use tokio::sync::Mutex;

pub const PASSWORD: &str = "password";

/// Records every verification email instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub username: String,
    pub to: String,
}

impl RecordingMailer {
    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl VerificationMailer for RecordingMailer {
    async fn send_verification_email(
        &self,
        account: &Account,
        new_email: &str,
    ) -> Result<(), MailerError> {
        self.sent.lock().await.push(SentMail {
            username: account.username.to_string(),
            to: new_email.to_string(),
        });
        Ok(())
    }
}

/// Serves a canned contributor list as given, or fails when given `None`.
#[derive(Debug, Clone)]
pub struct FixedContributors(pub Option<Vec<Contributor>>);

#[async_trait]
impl ContributorSource for FixedContributors {
    async fn contributors(&self) -> Result<Vec<Contributor>, ContributorError> {
        self.0.clone().ok_or(ContributorError::RateLimited)
    }
}

pub fn contributor(login: &str) -> Contributor {
    Contributor {
        login: login.to_string(),
        html_url: Some(format!("https://github.com/{login}")),
        avatar_url: None,
        contributions: 1,
    }
}

#[derive(Debug, Clone)]
pub struct TestOptions {
    pub confirmation_enabled: bool,
    pub contributors: Option<Vec<Contributor>>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            confirmation_enabled: true,
            contributors: Some(Vec::new()),
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub accounts: Arc<InMemoryAccountRepository>,
    pub mailer: Arc<RecordingMailer>,
    pub crypto: Arc<AuthCrypto>,
}

pub fn test_config(confirmation_enabled: bool) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig::default(),
        auth: AuthConfig {
            password_pepper: "test-pepper".into(),
            token_key: "test-token-key".into(),
            session_ttl_hours: 1,
        },
        mail: MailConfig {
            confirmation_enabled,
            from_address: "test@rstat.us".into(),
        },
        contributors: ContributorsConfig {
            api_base: "http://127.0.0.1:9".into(),
            owner: "hotsh".into(),
            repository: "rstat.us".into(),
            timeout_secs: 1,
        },
        cors: CorsConfig::default(),
        metadata: ConfigMetadata::default(),
    }
}

pub fn build_test_app(options: TestOptions) -> TestApp {
    let accounts = Arc::new(InMemoryAccountRepository::new());
    let mailer = Arc::new(RecordingMailer::default());
    let crypto = Arc::new(
        AuthCrypto::insecure_fast("test-pepper", "test-token-key")
            .expect("test crypto"),
    );

    let state = AppState::new(
        test_config(options.confirmation_enabled),
        crypto.clone(),
        AppPorts {
            accounts: accounts.clone(),
            sessions: Arc::new(InMemorySessionRepository::new()),
            mailer: mailer.clone(),
            contributors: Arc::new(FixedContributors(options.contributors)),
        },
    );

    let server =
        TestServer::new(create_app(state.clone())).expect("test server");

    TestApp {
        server,
        state,
        accounts,
        mailer,
        crypto,
    }
}

impl TestApp {
    pub async fn seed_account(&self, username: &str, email: Option<&str>) -> Account {
        let mut account = Account::new(
            Username::new(username).expect("valid username"),
            "Some User",
            self.crypto.hash_password(PASSWORD).expect("hash"),
        );
        account.email = email.map(str::to_string);
        account.email_confirmed = email.is_some();
        self.accounts.insert(account).await.expect("seed account")
    }

    /// Issue a session for `username` and return the bearer header value.
    pub async fn log_in_as(&self, username: &str) -> String {
        let issued = self
            .state
            .sessions
            .issue(username)
            .await
            .expect("issue session");
        bearer(&issued.token)
    }

    pub async fn stored(&self, account: &Account) -> Account {
        self.accounts
            .find_by_id(account.id)
            .await
            .expect("lookup")
            .expect("account present")
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
