use std::{fmt, sync::Arc};

use rstatus_core::application::{ProfileService, SessionService};
use rstatus_core::domain::accounts::AccountRepository;
use rstatus_core::domain::auth::{AuthCrypto, SessionRepository};
use rstatus_core::domain::contributors::ContributorSource;
use rstatus_core::domain::mail::VerificationMailer;

use crate::infra::config::Config;

/// Shared handles every request handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub profiles: Arc<ProfileService>,
    pub sessions: Arc<SessionService>,
    pub contributors: Arc<dyn ContributorSource>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// Storage and outbound adapters the state is assembled from.
pub struct AppPorts {
    pub accounts: Arc<dyn AccountRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub mailer: Arc<dyn VerificationMailer>,
    pub contributors: Arc<dyn ContributorSource>,
}

impl fmt::Debug for AppPorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppPorts").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(config: Config, crypto: Arc<AuthCrypto>, ports: AppPorts) -> Self {
        let profiles = ProfileService::new(
            ports.accounts.clone(),
            ports.mailer,
            crypto.clone(),
            config.mail.confirmation_enabled,
        );
        let sessions = SessionService::new(
            ports.sessions,
            ports.accounts,
            crypto,
            config.auth.session_ttl(),
        );

        Self {
            config: Arc::new(config),
            profiles: Arc::new(profiles),
            sessions: Arc::new(sessions),
            contributors: ports.contributors,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
