//! Outbound verification mail contract.

use async_trait::async_trait;
use tracing::info;

use crate::domain::accounts::Account;

#[async_trait]
pub trait VerificationMailer: Send + Sync {
    /// Ask `new_email`'s owner to confirm it belongs to `account`.
    async fn send_verification_email(
        &self,
        account: &Account,
        new_email: &str,
    ) -> Result<(), MailerError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum MailerError {
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

/// Mailer that only records the intent in the log. Used when no transport is
/// configured.
#[derive(Debug, Clone)]
pub struct LoggingMailer {
    from_address: String,
}

impl LoggingMailer {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
        }
    }
}

#[async_trait]
impl VerificationMailer for LoggingMailer {
    async fn send_verification_email(
        &self,
        account: &Account,
        new_email: &str,
    ) -> Result<(), MailerError> {
        info!(
            from = %self.from_address,
            to = %new_email,
            username = %account.username,
            "verification email queued"
        );
        Ok(())
    }
}
