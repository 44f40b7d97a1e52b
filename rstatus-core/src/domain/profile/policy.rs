use serde_json::Value;

use super::{PlainPassword, ProfileChangeRequest, ProfileUpdateError};
use crate::domain::accounts::Account;

/// Outcome of [`ProfileUpdatePolicy::evaluate`].
pub type ProfileUpdateResult = Result<ProfileUpdate, ProfileUpdateError>;

/// Sanitized set of fields a successful update persists.
///
/// `password_confirm` never appears here; `password` is present only when it
/// was confirmed, and is still plain text. Hashing is the caller's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub password: Option<PlainPassword>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Accepted update: what to persist and whether a verification email is owed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub patch: ProfilePatch,
    pub send_verification_email: bool,
}

/// Business rules for editing a profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileUpdatePolicy;

impl ProfileUpdatePolicy {
    /// Decide what a profile edit does to `account`.
    ///
    /// Pure: the same inputs always give the same result and nothing outside
    /// the return value changes. A password mismatch rejects the whole
    /// request, so no field is applied and no verification is owed.
    pub fn evaluate(
        account: Option<&Account>,
        request: &ProfileChangeRequest,
    ) -> ProfileUpdateResult {
        let account = account.ok_or(ProfileUpdateError::NotFound)?;
        let password = confirmed_password(request)?;

        let patch = ProfilePatch {
            name: request.name.clone(),
            website: request.website.clone(),
            bio: request.bio.clone(),
            email: request.email.clone(),
            password,
        };

        let send_verification_email = match request.email.as_deref() {
            Some(email) if !email.is_empty() => {
                account.email.as_deref() != Some(email)
            }
            _ => false,
        };

        Ok(ProfileUpdate {
            patch,
            send_verification_email,
        })
    }

    /// [`evaluate`](Self::evaluate) straight from a decoded request body.
    pub fn evaluate_json(
        account: Option<&Account>,
        body: &Value,
    ) -> ProfileUpdateResult {
        let account = account.ok_or(ProfileUpdateError::NotFound)?;
        let request = ProfileChangeRequest::from_json(body)?;
        Self::evaluate(Some(account), &request)
    }
}

/// A password is only taken together with an identical confirmation. Both
/// fields left blank means "no password change".
fn confirmed_password(
    request: &ProfileChangeRequest,
) -> Result<Option<PlainPassword>, ProfileUpdateError> {
    match (&request.password, &request.password_confirm) {
        (None, None) => Ok(None),
        (Some(password), Some(confirm)) if password == confirm => {
            if password.is_empty() {
                Ok(None)
            } else {
                Ok(Some(password.clone()))
            }
        }
        _ => Err(ProfileUpdateError::PasswordMismatch),
    }
}
