use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use rstatus_core::application::{ProfileServiceError, SessionServiceError};
use rstatus_core::domain::accounts::RepositoryError;
use rstatus_core::domain::profile::ProfileUpdateError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    /// The one 404 body every missing page shares.
    pub fn page_not_found() -> Self {
        Self::not_found(ProfileUpdateError::NotFound.reason())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<ProfileUpdateError> for AppError {
    fn from(err: ProfileUpdateError) -> Self {
        match err {
            ProfileUpdateError::NotFound => Self::page_not_found(),
            ProfileUpdateError::InvalidRequest(_) => {
                Self::bad_request(err.to_string())
            }
            ProfileUpdateError::PasswordMismatch => Self::unprocessable(
                format!("Profile could not be saved: {}", err.reason()),
            ),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::page_not_found(),
            RepositoryError::Conflict => Self::conflict(
                "Profile was changed by another request; reload and try again",
            ),
            RepositoryError::UsernameTaken => Self::conflict(err.to_string()),
            RepositoryError::Database(_) | RepositoryError::Corrupt(_) => {
                tracing::error!(error = %err, "storage operation failed");
                Self::internal("Storage operation failed")
            }
        }
    }
}

impl From<ProfileServiceError> for AppError {
    fn from(err: ProfileServiceError) -> Self {
        match err {
            ProfileServiceError::Rejected(inner) => inner.into(),
            ProfileServiceError::Repository(inner) => inner.into(),
            ProfileServiceError::InvalidUsername(_) => Self::page_not_found(),
            ProfileServiceError::Unauthenticated => {
                Self::unauthorized(err.to_string())
            }
            ProfileServiceError::Forbidden => Self::forbidden(err.to_string()),
            // Handlers turn this into a redirect before it gets here.
            ProfileServiceError::NonCanonical { .. } => Self::page_not_found(),
            ProfileServiceError::Crypto(inner) => {
                tracing::error!(error = %inner, "password hashing failed");
                Self::internal("Profile could not be saved")
            }
        }
    }
}

impl From<SessionServiceError> for AppError {
    fn from(err: SessionServiceError) -> Self {
        match err {
            SessionServiceError::UnknownAccount(_) => {
                Self::unauthorized("Invalid session")
            }
            SessionServiceError::Repository(inner) => inner.into(),
            SessionServiceError::Crypto(inner) => {
                tracing::error!(error = %inner, "session crypto failed");
                Self::internal("Session could not be verified")
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}
