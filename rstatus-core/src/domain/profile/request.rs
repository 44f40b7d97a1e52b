use std::fmt;

use serde_json::Value;
use zeroize::Zeroizing;

use super::ProfileUpdateError;

/// The fields a profile edit may carry. Anything else in a request is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Name,
    Website,
    Bio,
    Email,
    Password,
    PasswordConfirm,
}

impl ProfileField {
    pub const ALL: [ProfileField; 6] = [
        ProfileField::Name,
        ProfileField::Website,
        ProfileField::Bio,
        ProfileField::Email,
        ProfileField::Password,
        ProfileField::PasswordConfirm,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == key)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Website => "website",
            Self::Bio => "bio",
            Self::Email => "email",
            Self::Password => "password",
            Self::PasswordConfirm => "password_confirm",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plain-text password as submitted. Wiped from memory on drop and redacted
/// from debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(Zeroizing<String>);

impl PlainPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(Zeroizing::new(password.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(<redacted>)")
    }
}

/// Proposed profile changes, restricted to the recognized field set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChangeRequest {
    pub name: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub password: Option<PlainPassword>,
    pub password_confirm: Option<PlainPassword>,
}

impl ProfileChangeRequest {
    /// Build a request from a decoded body.
    ///
    /// The body must be an object. Unrecognized keys are skipped, `null`
    /// counts as absent, and any other non-string value for a recognized
    /// field is rejected.
    pub fn from_json(body: &Value) -> Result<Self, ProfileUpdateError> {
        let map = body.as_object().ok_or_else(|| {
            ProfileUpdateError::InvalidRequest(
                "expected an object of profile fields".to_string(),
            )
        })?;

        let mut request = Self::default();
        for (key, value) in map {
            let Some(field) = ProfileField::from_key(key) else {
                continue;
            };

            match value {
                Value::Null => {}
                Value::String(text) => request.set(field, text.clone()),
                _ => {
                    return Err(ProfileUpdateError::InvalidRequest(format!(
                        "field `{field}` must be a string"
                    )));
                }
            }
        }

        Ok(request)
    }

    /// Set a single field, replacing any earlier value.
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProfileField::Name => self.name = Some(value),
            ProfileField::Website => self.website = Some(value),
            ProfileField::Bio => self.bio = Some(value),
            ProfileField::Email => self.email = Some(value),
            ProfileField::Password => {
                self.password = Some(PlainPassword::new(value))
            }
            ProfileField::PasswordConfirm => {
                self.password_confirm = Some(PlainPassword::new(value))
            }
        }
    }

    pub fn with(mut self, field: ProfileField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }
}
