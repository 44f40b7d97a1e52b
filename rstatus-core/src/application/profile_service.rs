use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::accounts::{
    Account, AccountChanges, AccountRepository, RepositoryError, Username,
    UsernameError,
};
use crate::domain::auth::{AuthCrypto, AuthCryptoError};
use crate::domain::mail::VerificationMailer;
use crate::domain::profile::{
    ProfileChangeRequest, ProfileUpdate, ProfileUpdateError,
    ProfileUpdatePolicy,
};

/// Carries out profile lookups and edits: evaluates the policy, hashes the
/// password, persists the patch and dispatches the verification email.
#[derive(Clone)]
pub struct ProfileService {
    accounts: Arc<dyn AccountRepository>,
    mailer: Arc<dyn VerificationMailer>,
    crypto: Arc<AuthCrypto>,
    confirmation_enabled: bool,
}

impl std::fmt::Debug for ProfileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileService")
            .field("accounts_repo", &Arc::strong_count(&self.accounts))
            .field("confirmation_enabled", &self.confirmation_enabled)
            .finish()
    }
}

/// Result of resolving a requested username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLookup {
    /// The request already used the stored spelling.
    Found(Account),
    /// The account exists under a different case; send the client here.
    Redirect { canonical: Username },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdateOutcome {
    pub account: Account,
    pub verification_email_sent: bool,
}

/// Input for provisioning an account from the command line.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum ProfileServiceError {
    #[error(transparent)]
    Rejected(#[from] ProfileUpdateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Crypto(#[from] AuthCryptoError),

    #[error(transparent)]
    InvalidUsername(#[from] UsernameError),

    #[error("profile lives at {canonical}")]
    NonCanonical { canonical: Username },

    #[error("sign in to edit this profile")]
    Unauthenticated,

    #[error("profile belongs to another account")]
    Forbidden,
}

impl ProfileServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProfileServiceError::Rejected(ProfileUpdateError::NotFound)
                | ProfileServiceError::Repository(RepositoryError::NotFound)
        )
    }
}

impl ProfileService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        mailer: Arc<dyn VerificationMailer>,
        crypto: Arc<AuthCrypto>,
        confirmation_enabled: bool,
    ) -> Self {
        Self {
            accounts,
            mailer,
            crypto,
            confirmation_enabled,
        }
    }

    /// Resolve `requested` case-insensitively. Names that cannot be valid
    /// usernames are simply not found.
    pub async fn resolve(
        &self,
        requested: &str,
    ) -> Result<ProfileLookup, ProfileServiceError> {
        if Username::new(requested).is_err() {
            return Err(ProfileUpdateError::NotFound.into());
        }

        let account = self
            .accounts
            .find_by_username_ci(requested)
            .await?
            .ok_or(ProfileUpdateError::NotFound)?;

        if account.username.as_str() == requested {
            Ok(ProfileLookup::Found(account))
        } else {
            Ok(ProfileLookup::Redirect {
                canonical: account.username,
            })
        }
    }

    /// Look up `requested`, check that `viewer` owns it and save the edit
    /// decoded from `body`.
    ///
    /// The body is only parsed once [`ProfileService::authorize`] passes.
    pub async fn update(
        &self,
        requested: &str,
        viewer: Option<&Account>,
        body: &Value,
    ) -> Result<ProfileUpdateOutcome, ProfileServiceError> {
        let account = self.authorize(requested, viewer).await?;
        let request = ProfileChangeRequest::from_json(body)?;
        self.save(&account, &request).await
    }

    /// The account `viewer` may edit under `requested`.
    ///
    /// A missing account wins over everything else, then a differently-cased
    /// username ([`ProfileServiceError::NonCanonical`]), then a missing
    /// viewer, then ownership.
    pub async fn authorize(
        &self,
        requested: &str,
        viewer: Option<&Account>,
    ) -> Result<Account, ProfileServiceError> {
        let account = match self.resolve(requested).await? {
            ProfileLookup::Found(account) => account,
            ProfileLookup::Redirect { canonical } => {
                return Err(ProfileServiceError::NonCanonical { canonical });
            }
        };

        let viewer = viewer.ok_or(ProfileServiceError::Unauthenticated)?;
        if viewer.id != account.id {
            warn!(
                viewer = %viewer.username,
                target = %account.username,
                "attempt to edit another profile"
            );
            return Err(ProfileServiceError::Forbidden);
        }

        Ok(account)
    }

    /// Apply a profile edit to `account`.
    ///
    /// Callers must have checked that the editor owns `account`. Nothing is
    /// written unless the policy accepts the request, and at most one
    /// verification email goes out per call.
    pub async fn save(
        &self,
        account: &Account,
        request: &ProfileChangeRequest,
    ) -> Result<ProfileUpdateOutcome, ProfileServiceError> {
        let update = match ProfileUpdatePolicy::evaluate(Some(account), request)
        {
            Ok(update) => update,
            Err(err) => {
                info!(
                    username = %account.username,
                    reason = %err,
                    "profile update rejected"
                );
                return Err(err.into());
            }
        };

        let changes = self.changes_for(account, &update)?;
        if changes.is_empty() {
            return Ok(ProfileUpdateOutcome {
                account: account.clone(),
                verification_email_sent: false,
            });
        }

        let updated = self
            .accounts
            .apply_changes(account.id, account.version, &changes)
            .await
            .inspect_err(|err| {
                warn!(username = %account.username, error = %err, "profile update not persisted")
            })?;

        info!(
            username = %updated.username,
            password_changed = changes.password_hash.is_some(),
            email_changed = changes.email.is_some(),
            "profile updated"
        );

        let verification_email_sent =
            self.dispatch_verification(&updated, &update).await;

        Ok(ProfileUpdateOutcome {
            account: updated,
            verification_email_sent,
        })
    }

    /// Provision an account with a hashed password.
    pub async fn create_account(
        &self,
        new_account: NewAccount,
    ) -> Result<Account, ProfileServiceError> {
        let username = Username::new(&new_account.username)?;
        if self.accounts.username_exists(&username).await? {
            return Err(RepositoryError::UsernameTaken.into());
        }

        let password_hash = self.crypto.hash_password(&new_account.password)?;
        let mut account =
            Account::new(username, new_account.name, password_hash);
        account.email = new_account.email.filter(|email| !email.is_empty());
        account.email_confirmed =
            account.email.is_some() && !self.confirmation_enabled;

        let account = self.accounts.insert(account).await?;
        info!(username = %account.username, id = %account.id, "account created");

        if let Some(email) = account.email.clone()
            && self.confirmation_enabled
            && let Err(err) =
                self.mailer.send_verification_email(&account, &email).await
        {
            error!(username = %account.username, error = %err, "verification email failed");
        }

        Ok(account)
    }

    fn changes_for(
        &self,
        account: &Account,
        update: &ProfileUpdate,
    ) -> Result<AccountChanges, AuthCryptoError> {
        let patch = &update.patch;

        let password_hash = patch
            .password
            .as_ref()
            .map(|password| self.crypto.hash_password(password.expose()))
            .transpose()?;

        let email_changed = patch
            .email
            .as_deref()
            .is_some_and(|email| account.email.as_deref().unwrap_or("") != email);

        let email_confirmed = if update.send_verification_email {
            Some(!self.confirmation_enabled)
        } else if email_changed {
            // Email cleared.
            Some(false)
        } else {
            None
        };

        Ok(AccountChanges {
            name: patch.name.clone(),
            website: patch.website.clone(),
            bio: patch.bio.clone(),
            email: patch.email.clone().filter(|_| email_changed),
            password_hash,
            email_confirmed,
        })
    }

    async fn dispatch_verification(
        &self,
        account: &Account,
        update: &ProfileUpdate,
    ) -> bool {
        if !update.send_verification_email {
            return false;
        }

        let Some(email) = update.patch.email.as_deref() else {
            return false;
        };

        if !self.confirmation_enabled {
            info!(username = %account.username, "email confirmation disabled; skipping verification");
            return false;
        }

        match self.mailer.send_verification_email(account, email).await {
            Ok(()) => true,
            Err(err) => {
                error!(
                    username = %account.username,
                    error = %err,
                    "verification email failed"
                );
                false
            }
        }
    }
}
